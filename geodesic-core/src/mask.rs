//! Capability masks.
//!
//! A mask is a single `u64` carrying two tiers of flags:
//!
//! | bits | meaning |
//! |------|---------|
//! | 0..=4 | [`SeriesGroup`]s the engine must evaluate |
//! | 7..=14 | [`OutputField`]s the caller asked for |
//!
//! Every output field constant of [`OutMask`] already carries the series
//! groups it depends on. The dependencies live in one static table
//! ([`OutputField::dependencies`]) and the constants are derived from it at
//! compile time, so requesting a field is a plain bitwise OR and no
//! dependency resolution happens per call.
//!
//! ```
//! use geodesic_core::{OutMask, OutputField, SeriesGroup};
//!
//! let mask = OutMask::combine([OutputField::Longitude, OutputField::Area]);
//!
//! assert_eq!(mask, OutMask::LONGITUDE | OutMask::AREA);
//! assert!(mask.requires(OutputField::Longitude));
//! assert!(!mask.requires(OutputField::Distance));
//! assert!(mask.needs(SeriesGroup::C3));
//! assert!(mask.needs(SeriesGroup::C4));
//! assert_eq!(mask.to_string(), "LONGITUDE | AREA");
//! ```

use anyhow::{Context as _, anyhow, bail, ensure};
use logos::{Lexer, Logos};
use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

/// Category of auxiliary trigonometric series evaluated by the engine.
///
/// Each group gates a disjoint piece of the computation:
///
/// * `C1`: distance along the geodesic;
/// * `C1p`: the inverse of the `C1` series, needed to use a distance as input;
/// * `C2`: reduced length and geodesic scales;
/// * `C3`: longitude;
/// * `C4`: area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesGroup {
    C1,
    C1p,
    C2,
    C3,
    C4,
}

impl SeriesGroup {
    pub const ALL: [Self; 5] = [Self::C1, Self::C1p, Self::C2, Self::C3, Self::C4];

    /// the bit of this group within an [`OutMask`]
    pub const fn bit(self) -> u64 {
        match self {
            Self::C1 => 1 << 0,
            Self::C1p => 1 << 1,
            Self::C2 => 1 << 2,
            Self::C3 => 1 << 3,
            Self::C4 => 1 << 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::C1 => "C1",
            Self::C1p => "C1p",
            Self::C2 => "C2",
            Self::C3 => "C3",
            Self::C4 => "C4",
        }
    }
}

impl fmt::Display for SeriesGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A quantity a caller may request from a direct or inverse solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputField {
    /// latitude of the end point (`lat2`)
    Latitude,
    /// longitude of the end point (`lon2`)
    Longitude,
    /// azimuths (`azi1`, `azi2`)
    Azimuth,
    /// distance (`s12`)
    Distance,
    /// allow the distance to be the input of a direct solution
    DistanceIn,
    /// reduced length (`m12`)
    ReducedLength,
    /// geodesic scales (`M12`, `M21`)
    GeodesicScale,
    /// area between the geodesic and the equator (`S12`)
    Area,
}

/// Output field to series groups.
///
/// Entries are indexed by the field discriminant; this is checked at
/// compile time below.
const FIELD_DEPENDENCIES: [(OutputField, &[SeriesGroup]); 8] = [
    (OutputField::Latitude, &[]),
    (OutputField::Longitude, &[SeriesGroup::C3]),
    (OutputField::Azimuth, &[]),
    (OutputField::Distance, &[SeriesGroup::C1]),
    (OutputField::DistanceIn, &[SeriesGroup::C1, SeriesGroup::C1p]),
    (OutputField::ReducedLength, &[SeriesGroup::C1, SeriesGroup::C2]),
    (OutputField::GeodesicScale, &[SeriesGroup::C1, SeriesGroup::C2]),
    (OutputField::Area, &[SeriesGroup::C4]),
];

const _: () = {
    let mut i = 0;
    while i < FIELD_DEPENDENCIES.len() {
        assert!(FIELD_DEPENDENCIES[i].0 as usize == i);
        i += 1;
    }
};

/// position of the first output bit
const OUTPUT_SHIFT: u64 = 7;
const SERIES_BITS: u64 = 0x1F;
const OUTPUT_BITS: u64 = 0x7F80;

impl OutputField {
    pub const ALL: [Self; 8] = [
        Self::Latitude,
        Self::Longitude,
        Self::Azimuth,
        Self::Distance,
        Self::DistanceIn,
        Self::ReducedLength,
        Self::GeodesicScale,
        Self::Area,
    ];

    /// the output bit of this field, without its dependencies
    pub const fn output_bit(self) -> u64 {
        1 << (OUTPUT_SHIFT + self as u64)
    }

    /// the series groups the engine must evaluate to produce this field
    pub const fn dependencies(self) -> &'static [SeriesGroup] {
        FIELD_DEPENDENCIES[self as usize].1
    }

    /// the output bit OR'd with the bits of all its dependencies
    pub const fn mask(self) -> OutMask {
        let dependencies = self.dependencies();
        let mut bits = self.output_bit();
        let mut i = 0;
        while i < dependencies.len() {
            bits |= dependencies[i].bit();
            i += 1;
        }
        OutMask(bits)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Latitude => "LATITUDE",
            Self::Longitude => "LONGITUDE",
            Self::Azimuth => "AZIMUTH",
            Self::Distance => "DISTANCE",
            Self::DistanceIn => "DISTANCE_IN",
            Self::ReducedLength => "REDUCED_LENGTH",
            Self::GeodesicScale => "GEODESIC_SCALE",
            Self::Area => "AREA",
        }
    }
}

impl fmt::Display for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Token::lexer(s);

        let Some(token) = lex.next() else {
            bail!("Failed to parse OutputField: empty")
        };
        let token = token.map_err(|()| anyhow!("Failed to parse OutputField `{s}`"))?;
        ensure!(
            lex.next().is_none(),
            "Failed to parse OutputField `{s}`: expected a single field name"
        );

        match token.term() {
            Some(Term::Field(field)) => Ok(field),
            _ => Err(anyhow!(
                "Failed to parse OutputField `{s}`: not an output field"
            )),
        }
    }
}

/// Bitfield of requested outputs and the series groups they require.
///
/// The value is bit-exact with the masks of GeographicLib, so masks can be
/// stored or exchanged as plain integers with [`OutMask::bits`] and
/// [`OutMask::from_bits`].
///
/// ```
/// # use geodesic_core::OutMask;
/// assert_eq!(OutMask::DISTANCE.bits(), 0x401);
/// assert_eq!(OutMask::ALL.bits(), 0x7F9F);
/// assert_eq!(OutMask::from_bits(0x401), OutMask::DISTANCE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutMask(u64);

impl OutMask {
    /// no capabilities, no output
    pub const NONE: Self = Self(0);
    pub const LATITUDE: Self = OutputField::Latitude.mask();
    pub const LONGITUDE: Self = OutputField::Longitude.mask();
    pub const AZIMUTH: Self = OutputField::Azimuth.mask();
    pub const DISTANCE: Self = OutputField::Distance.mask();
    pub const DISTANCE_IN: Self = OutputField::DistanceIn.mask();
    pub const REDUCED_LENGTH: Self = OutputField::ReducedLength.mask();
    pub const GEODESIC_SCALE: Self = OutputField::GeodesicScale.mask();
    pub const AREA: Self = OutputField::Area.mask();
    /// every output field and every series group
    pub const ALL: Self = Self(OUTPUT_BITS | SERIES_BITS);

    /// Build a mask from its integer form.
    ///
    /// Bits that are neither an output field nor a series group are
    /// dropped.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// bitwise OR of the constants of every field in `fields`
    pub fn combine<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = OutputField>,
    {
        fields
            .into_iter()
            .fold(Self::NONE, |mask, field| mask.union(field.mask()))
    }

    /// Was `field` requested?
    ///
    /// The series bits are stripped before testing: two fields sharing a
    /// dependency (e.g. [`OutMask::DISTANCE`] and
    /// [`OutMask::REDUCED_LENGTH`] both need `C1`) never report each other
    /// as present.
    ///
    /// ```
    /// # use geodesic_core::{OutMask, OutputField};
    /// assert!(OutMask::DISTANCE.requires(OutputField::Distance));
    /// assert!(!OutMask::DISTANCE.requires(OutputField::ReducedLength));
    /// ```
    pub const fn requires(self, field: OutputField) -> bool {
        self.outputs().0 & field.mask().0 != 0
    }

    /// Does the engine need to evaluate the `group` series?
    pub const fn needs(self, group: SeriesGroup) -> bool {
        self.0 & group.bit() != 0
    }

    /// `true` if any output field of `other` is requested by `self`
    pub const fn intersects(self, other: Self) -> bool {
        self.outputs().0 & other.0 != 0
    }

    /// only the series group bits
    pub const fn series(self) -> Self {
        Self(self.0 & SERIES_BITS)
    }

    /// only the output field bits
    pub const fn outputs(self) -> Self {
        Self(self.0 & OUTPUT_BITS)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Add the series groups of every requested field.
    ///
    /// A mask built from raw bits may name an output without its series
    /// groups; the engine closes it before solving.
    pub fn with_dependencies(self) -> Self {
        self.union(Self::combine(self.fields()))
    }

    /// Remove the output bit of `field`, keeping every series bit.
    pub(crate) const fn without_output(self, field: OutputField) -> Self {
        Self(self.0 & !field.output_bit())
    }

    /// the requested output fields, in bit order
    pub fn fields(self) -> impl Iterator<Item = OutputField> {
        OutputField::ALL
            .into_iter()
            .filter(move |field| self.requires(*field))
    }

    /// series groups set in `self` that none of its output fields imply
    fn extra_series(self) -> impl Iterator<Item = SeriesGroup> {
        let implied = Self::combine(self.fields()).series();
        SeriesGroup::ALL
            .into_iter()
            .filter(move |group| self.needs(*group) && !implied.needs(*group))
    }
}

impl From<OutputField> for OutMask {
    fn from(field: OutputField) -> Self {
        field.mask()
    }
}

impl From<SeriesGroup> for OutMask {
    fn from(group: SeriesGroup) -> Self {
        Self(group.bit())
    }
}

impl FromIterator<OutputField> for OutMask {
    fn from_iter<I: IntoIterator<Item = OutputField>>(iter: I) -> Self {
        Self::combine(iter)
    }
}

impl BitOr for OutMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOr<OutputField> for OutMask {
    type Output = Self;

    fn bitor(self, rhs: OutputField) -> Self::Output {
        self.union(rhs.mask())
    }
}

impl BitOrAssign for OutMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitOrAssign<OutputField> for OutMask {
    fn bitor_assign(&mut self, rhs: OutputField) {
        *self = self.union(rhs.mask());
    }
}

impl fmt::Display for OutMask {
    /// Formats as `NONE`, `ALL` or the `|`-separated list of the requested
    /// fields followed by any series group the fields do not imply.
    ///
    /// ```
    /// # use geodesic_core::{OutMask, SeriesGroup};
    /// assert_eq!(OutMask::NONE.to_string(), "NONE");
    /// assert_eq!(OutMask::ALL.to_string(), "ALL");
    /// assert_eq!(
    ///     (OutMask::DISTANCE | OutMask::from(SeriesGroup::C4)).to_string(),
    ///     "DISTANCE | C4"
    /// );
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        if *self == Self::ALL {
            return f.write_str("ALL");
        }

        let fields = self.fields().map(OutputField::name);
        let series = self.extra_series().map(SeriesGroup::name);
        for (i, name) in fields.chain(series).enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl FromStr for OutMask {
    type Err = anyhow::Error;

    /// Parse the text form produced by [`fmt::Display`].
    ///
    /// Names are case insensitive.
    ///
    /// ```
    /// # use geodesic_core::OutMask;
    /// let mask: OutMask = "latitude | Longitude|AREA".parse().unwrap();
    /// assert_eq!(mask, OutMask::LATITUDE | OutMask::LONGITUDE | OutMask::AREA);
    /// assert!("latitude |".parse::<OutMask>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Token::lexer(s);
        let mut mask = Self::NONE;

        loop {
            let term =
                next_term(&mut lex).with_context(|| format!("Failed to parse OutMask `{s}`"))?;
            mask |= term.mask();

            match lex.next() {
                None => break,
                Some(Ok(Token::Pipe)) => continue,
                Some(_) => bail!(
                    "Failed to parse OutMask `{s}`: expected `|` before `{}`",
                    lex.slice()
                ),
            }
        }

        Ok(mask)
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum Token {
    #[token("|")]
    Pipe,

    #[token("none", ignore(case))]
    Nothing,
    #[token("all", ignore(case))]
    Everything,

    #[token("latitude", ignore(case))]
    Latitude,
    #[token("longitude", ignore(case))]
    Longitude,
    #[token("azimuth", ignore(case))]
    Azimuth,
    #[token("distance", ignore(case))]
    Distance,
    #[token("distance_in", ignore(case))]
    DistanceIn,
    #[token("reduced_length", ignore(case))]
    ReducedLength,
    #[token("geodesic_scale", ignore(case))]
    GeodesicScale,
    #[token("area", ignore(case))]
    Area,

    #[token("c1", ignore(case))]
    C1,
    #[token("c1p", ignore(case))]
    C1p,
    #[token("c2", ignore(case))]
    C2,
    #[token("c3", ignore(case))]
    C3,
    #[token("c4", ignore(case))]
    C4,
}

/// one operand of the `|` grammar
#[derive(Debug, Clone, Copy, PartialEq)]
enum Term {
    Nothing,
    Everything,
    Field(OutputField),
    Series(SeriesGroup),
}

impl Term {
    fn mask(self) -> OutMask {
        match self {
            Self::Nothing => OutMask::NONE,
            Self::Everything => OutMask::ALL,
            Self::Field(field) => field.mask(),
            Self::Series(group) => group.into(),
        }
    }
}

impl Token {
    fn term(self) -> Option<Term> {
        let term = match self {
            Self::Pipe => return None,
            Self::Nothing => Term::Nothing,
            Self::Everything => Term::Everything,
            Self::Latitude => Term::Field(OutputField::Latitude),
            Self::Longitude => Term::Field(OutputField::Longitude),
            Self::Azimuth => Term::Field(OutputField::Azimuth),
            Self::Distance => Term::Field(OutputField::Distance),
            Self::DistanceIn => Term::Field(OutputField::DistanceIn),
            Self::ReducedLength => Term::Field(OutputField::ReducedLength),
            Self::GeodesicScale => Term::Field(OutputField::GeodesicScale),
            Self::Area => Term::Field(OutputField::Area),
            Self::C1 => Term::Series(SeriesGroup::C1),
            Self::C1p => Term::Series(SeriesGroup::C1p),
            Self::C2 => Term::Series(SeriesGroup::C2),
            Self::C3 => Term::Series(SeriesGroup::C3),
            Self::C4 => Term::Series(SeriesGroup::C4),
        };
        Some(term)
    }
}

fn next_term(lex: &mut Lexer<'_, Token>) -> anyhow::Result<Term> {
    let Some(token) = lex.next() else {
        bail!("expected a field name, found end of input")
    };
    let token = token.map_err(|()| anyhow!("unknown name `{}`", lex.slice()))?;

    token
        .term()
        .ok_or_else(|| anyhow!("expected a field name, found `{}`", lex.slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_bit_exact() {
        assert_eq!(OutMask::NONE.bits(), 0);
        assert_eq!(OutMask::LATITUDE.bits(), 1 << 7);
        assert_eq!(OutMask::LONGITUDE.bits(), (1 << 8) | (1 << 3));
        assert_eq!(OutMask::AZIMUTH.bits(), 1 << 9);
        assert_eq!(OutMask::DISTANCE.bits(), (1 << 10) | (1 << 0));
        assert_eq!(OutMask::DISTANCE_IN.bits(), (1 << 11) | (1 << 0) | (1 << 1));
        assert_eq!(OutMask::REDUCED_LENGTH.bits(), (1 << 12) | (1 << 0) | (1 << 2));
        assert_eq!(OutMask::GEODESIC_SCALE.bits(), (1 << 13) | (1 << 0) | (1 << 2));
        assert_eq!(OutMask::AREA.bits(), (1 << 14) | (1 << 4));
        assert_eq!(OutMask::ALL.bits(), 0x7F80 | 0x1F);
    }

    #[test]
    fn all_is_every_field_and_every_series() {
        let mut mask = OutMask::combine(OutputField::ALL);
        for group in SeriesGroup::ALL {
            mask |= OutMask::from(group);
        }
        assert_eq!(mask, OutMask::ALL);
    }

    #[test]
    fn single_field_requires_itself_only() {
        for field in OutputField::ALL {
            let mask = OutMask::combine([field]);
            assert!(mask.requires(field), "{field}");

            for other in OutputField::ALL.into_iter().filter(|other| *other != field) {
                assert!(!mask.requires(other), "{field} should not require {other}");
            }
        }
    }

    #[test]
    fn empty_requires_nothing() {
        let mask = OutMask::combine([]);
        assert_eq!(mask, OutMask::NONE);
        for field in OutputField::ALL {
            assert!(!mask.requires(field));
        }
    }

    #[test]
    fn series_only_mask_requires_no_field() {
        let mask = OutMask::ALL.series();
        for field in OutputField::ALL {
            assert!(!mask.requires(field));
        }
        for group in SeriesGroup::ALL {
            assert!(mask.needs(group));
        }
    }

    #[test]
    fn combine_is_commutative_associative_idempotent() {
        let a = OutputField::Longitude;
        let b = OutputField::ReducedLength;
        let c = OutputField::Area;

        assert_eq!(OutMask::combine([a, b]), OutMask::combine([b, a]));
        assert_eq!(
            OutMask::combine([a, b]) | OutMask::from(c),
            OutMask::from(a) | OutMask::combine([b, c]),
        );
        assert_eq!(OutMask::combine([a, a, a]), OutMask::from(a));
    }

    #[test]
    fn dependencies_match_table() {
        assert!(OutMask::LONGITUDE.needs(SeriesGroup::C3));
        assert!(OutMask::AREA.needs(SeriesGroup::C4));
        assert!(OutMask::DISTANCE.needs(SeriesGroup::C1));
        assert!(OutMask::DISTANCE_IN.needs(SeriesGroup::C1p));
        assert!(OutMask::GEODESIC_SCALE.needs(SeriesGroup::C2));
        assert!(!OutMask::LATITUDE.needs(SeriesGroup::C1));
        assert_eq!(OutMask::AZIMUTH.series(), OutMask::NONE);
    }

    #[test]
    fn from_bits_drops_unknown_bits() {
        // bit 15 is the long-unroll flag in GeographicLib, not modelled here
        let mask = OutMask::from_bits((1 << 15) | OutMask::AREA.bits() | (1 << 5));
        assert_eq!(mask, OutMask::AREA);
    }

    #[test]
    fn intersects_ignores_shared_series() {
        assert!(!OutMask::DISTANCE.intersects(OutMask::REDUCED_LENGTH));
        assert!(OutMask::ALL.intersects(OutMask::AREA));
    }

    #[test]
    fn without_output_keeps_series() {
        let mask = OutMask::DISTANCE_IN.without_output(OutputField::DistanceIn);
        assert!(!mask.requires(OutputField::DistanceIn));
        assert!(mask.needs(SeriesGroup::C1p));
    }

    #[test]
    fn with_dependencies_closes_raw_bits() {
        let raw = OutMask::from_bits(OutputField::ReducedLength.output_bit());
        assert!(!raw.needs(SeriesGroup::C2));

        let closed = raw.with_dependencies();
        assert_eq!(closed, OutMask::REDUCED_LENGTH);
        assert_eq!(OutMask::ALL.with_dependencies(), OutMask::ALL);
        assert_eq!(OutMask::NONE.with_dependencies(), OutMask::NONE);
    }

    #[test]
    fn fields_in_bit_order() {
        let mask = OutMask::AREA | OutMask::LATITUDE | OutMask::DISTANCE;
        let fields: Vec<_> = mask.fields().collect();
        assert_eq!(
            fields,
            vec![
                OutputField::Latitude,
                OutputField::Distance,
                OutputField::Area
            ]
        );
    }

    #[test]
    fn logos_lexer() {
        let mut lex = Token::lexer("distance_in|C1p");

        assert_eq!(lex.next(), Some(Ok(Token::DistanceIn)));
        assert_eq!(lex.slice(), "distance_in");
        assert_eq!(lex.next(), Some(Ok(Token::Pipe)));
        assert_eq!(lex.next(), Some(Ok(Token::C1p)));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn display() {
        assert_eq!(OutMask::NONE.to_string(), "NONE");
        assert_eq!(OutMask::ALL.to_string(), "ALL");
        assert_eq!(OutMask::DISTANCE.to_string(), "DISTANCE");
        assert_eq!(
            (OutMask::LATITUDE | OutMask::GEODESIC_SCALE).to_string(),
            "LATITUDE | GEODESIC_SCALE"
        );
        assert_eq!(OutMask::ALL.series().to_string(), "C1 | C1p | C2 | C3 | C4");
    }

    #[test]
    fn parse() {
        assert_eq!("none".parse::<OutMask>().unwrap(), OutMask::NONE);
        assert_eq!("ALL".parse::<OutMask>().unwrap(), OutMask::ALL);
        assert_eq!(
            " reduced_length |area ".parse::<OutMask>().unwrap(),
            OutMask::REDUCED_LENGTH | OutMask::AREA
        );
        assert_eq!(
            "distance | c4".parse::<OutMask>().unwrap(),
            OutMask::DISTANCE | OutMask::from(SeriesGroup::C4)
        );
    }

    #[test]
    fn display_parse_roundtrip() {
        let masks = [
            OutMask::NONE,
            OutMask::ALL,
            OutMask::ALL.series(),
            OutMask::LONGITUDE | OutMask::AZIMUTH,
            OutMask::DISTANCE | OutMask::from(SeriesGroup::C1p),
            OutMask::combine(OutputField::ALL),
        ];
        for mask in masks {
            assert_eq!(mask.to_string().parse::<OutMask>().unwrap(), mask, "{mask}");
        }
    }

    #[test]
    fn parse_rejects_invalid_values() {
        let empty = "".parse::<OutMask>().unwrap_err();
        assert!(format!("{empty:#}").contains("end of input"));

        let trailing = "latitude |".parse::<OutMask>().unwrap_err();
        assert!(format!("{trailing:#}").contains("end of input"));

        let missing_pipe = "latitude longitude".parse::<OutMask>().unwrap_err();
        assert!(missing_pipe.to_string().contains("expected `|`"));

        let unknown = "latitude | height".parse::<OutMask>().unwrap_err();
        assert!(format!("{unknown:#}").contains("unknown name"));
    }

    #[test]
    fn output_field_parse() {
        assert_eq!(
            "geodesic_scale".parse::<OutputField>().unwrap(),
            OutputField::GeodesicScale
        );
        for field in OutputField::ALL {
            assert_eq!(field.to_string().parse::<OutputField>().unwrap(), field);
        }
        assert!("all".parse::<OutputField>().is_err());
        assert!("c1".parse::<OutputField>().is_err());
        assert!("area | distance".parse::<OutputField>().is_err());
    }
}
