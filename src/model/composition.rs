use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::types::Element;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCompositionError {
    #[error("formula descriptor is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),

    #[error("unbalanced group delimiter at position {pos}")]
    UnbalancedGroup { pos: usize },

    #[error("atom count overflows at position {pos}")]
    CountOverflow { pos: usize },
}

/// Elemental composition of a compound: element to atom count.
///
/// Parsed from descriptors such as `H2O`, `Ca(OH)2`, `[Cu(NH3)4]SO4` or the
/// hydrate form `CuSO4·5H2O` (`.` and `*` are accepted as the hydrate dot).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    atoms: BTreeMap<Element, u32>,
}

impl Composition {
    pub fn parse(descriptor: &str) -> Result<Self, ParseCompositionError> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(ParseCompositionError::Empty);
        }

        let chars: Vec<char> = descriptor.chars().collect();
        let mut atoms = BTreeMap::new();
        let mut start = 0;

        for (pos, ch) in chars.iter().enumerate() {
            if is_hydrate_dot(*ch) {
                parse_part(&chars, start, pos, &mut atoms)?;
                start = pos + 1;
            }
        }
        parse_part(&chars, start, chars.len(), &mut atoms)?;

        Ok(Self { atoms })
    }

    pub fn count(&self, element: Element) -> u32 {
        self.atoms.get(&element).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, u32)> + '_ {
        self.atoms.iter().map(|(e, n)| (*e, *n))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Molar mass in g/mol.
    pub fn molar_mass(&self) -> f64 {
        self.atoms
            .iter()
            .map(|(element, count)| element.atomic_mass() * f64::from(*count))
            .sum()
    }

    /// Elements in Hill order: carbon, hydrogen, then alphabetical. Without
    /// carbon everything is alphabetical.
    fn hill_order(&self) -> Vec<(Element, u32)> {
        let mut ordered: Vec<(Element, u32)> = self.iter().collect();
        let has_carbon = self.atoms.contains_key(&Element::C);
        ordered.sort_by(|(a, _), (b, _)| {
            let rank = |e: &Element| match (has_carbon, e) {
                (true, Element::C) => 0,
                (true, Element::H) => 1,
                _ => 2,
            };
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.symbol().cmp(b.symbol()))
        });
        ordered
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (element, count) in self.hill_order() {
            if count == 1 {
                write!(f, "{}", element)?;
            } else {
                write!(f, "{}{}", element, count)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Composition {
    type Err = ParseCompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the counts of a formula descriptor as unicode subscripts, e.g.
/// `CuSO4·5H2O` becomes `CuSO₄·5H₂O`. A hydrate multiplier stays full size.
pub fn subscript_label(descriptor: &str) -> String {
    let mut out = String::with_capacity(descriptor.len() * 2);
    let mut subscripting = false;

    for ch in descriptor.trim().chars() {
        if ch.is_ascii_digit() {
            if subscripting {
                out.push(subscript_digit(ch));
            } else {
                out.push(ch);
            }
            continue;
        }
        subscripting = ch.is_ascii_alphabetic() || matches!(ch, ')' | ']');
        out.push(ch);
    }

    out
}

fn subscript_digit(ch: char) -> char {
    const SUBSCRIPTS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
    ch.to_digit(10)
        .map(|d| SUBSCRIPTS[d as usize])
        .unwrap_or(ch)
}

fn is_hydrate_dot(ch: char) -> bool {
    matches!(ch, '·' | '•' | '.' | '*')
}

fn parse_part(
    chars: &[char],
    start: usize,
    end: usize,
    atoms: &mut BTreeMap<Element, u32>,
) -> Result<(), ParseCompositionError> {
    if start == end {
        return Err(if end < chars.len() {
            ParseCompositionError::UnexpectedChar {
                ch: chars[end],
                pos: end,
            }
        } else {
            ParseCompositionError::Empty
        });
    }

    let mut pos = start;
    let multiplier = read_count(chars, &mut pos, end)?.unwrap_or(1);

    // Each frame collects the atoms of one group until its closing delimiter.
    let mut stack: Vec<(BTreeMap<Element, u32>, char, usize)> = vec![(BTreeMap::new(), '\0', pos)];

    while pos < end {
        let ch = chars[pos];
        match ch {
            '(' | '[' => {
                stack.push((BTreeMap::new(), ch, pos));
                pos += 1;
            }
            ')' | ']' => {
                let open = if ch == ')' { '(' } else { '[' };
                let (group, opened_with, _) = stack
                    .pop()
                    .ok_or(ParseCompositionError::UnbalancedGroup { pos })?;
                if opened_with != open || stack.is_empty() {
                    return Err(ParseCompositionError::UnbalancedGroup { pos });
                }
                pos += 1;
                let count = read_count(chars, &mut pos, end)?.unwrap_or(1);
                let (parent, _, _) = stack
                    .last_mut()
                    .ok_or(ParseCompositionError::UnbalancedGroup { pos })?;
                merge(parent, &group, count, pos)?;
            }
            'A'..='Z' => {
                let mut symbol = String::from(ch);
                pos += 1;
                while pos < end && chars[pos].is_ascii_lowercase() {
                    symbol.push(chars[pos]);
                    pos += 1;
                }
                let element = symbol
                    .parse::<Element>()
                    .map_err(|_| ParseCompositionError::UnknownElement(symbol))?;
                let count = read_count(chars, &mut pos, end)?.unwrap_or(1);
                let (frame, _, _) = stack
                    .last_mut()
                    .ok_or(ParseCompositionError::UnbalancedGroup { pos })?;
                add_atoms(frame, element, count, pos)?;
            }
            _ => return Err(ParseCompositionError::UnexpectedChar { ch, pos }),
        }
    }

    let (root, _, opened_at) = stack.pop().ok_or(ParseCompositionError::Empty)?;
    if !stack.is_empty() {
        return Err(ParseCompositionError::UnbalancedGroup { pos: opened_at });
    }
    if root.is_empty() {
        return Err(ParseCompositionError::Empty);
    }
    merge(atoms, &root, multiplier, pos)
}

fn read_count(
    chars: &[char],
    pos: &mut usize,
    end: usize,
) -> Result<Option<u32>, ParseCompositionError> {
    let begin = *pos;
    let mut value: u32 = 0;
    while *pos < end && chars[*pos].is_ascii_digit() {
        let digit = chars[*pos].to_digit(10).unwrap_or(0);
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or(ParseCompositionError::CountOverflow { pos: *pos })?;
        *pos += 1;
    }
    if *pos == begin {
        Ok(None)
    } else if value == 0 {
        Err(ParseCompositionError::UnexpectedChar {
            ch: '0',
            pos: begin,
        })
    } else {
        Ok(Some(value))
    }
}

fn add_atoms(
    into: &mut BTreeMap<Element, u32>,
    element: Element,
    count: u32,
    pos: usize,
) -> Result<(), ParseCompositionError> {
    let slot = into.entry(element).or_insert(0);
    *slot = slot
        .checked_add(count)
        .ok_or(ParseCompositionError::CountOverflow { pos })?;
    Ok(())
}

fn merge(
    into: &mut BTreeMap<Element, u32>,
    group: &BTreeMap<Element, u32>,
    multiplier: u32,
    pos: usize,
) -> Result<(), ParseCompositionError> {
    for (element, count) in group {
        let scaled = count
            .checked_mul(multiplier)
            .ok_or(ParseCompositionError::CountOverflow { pos })?;
        add_atoms(into, *element, scaled, pos)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn parses_simple_molecules() {
        let water = Composition::parse("H2O").unwrap();
        assert_eq!(water.count(Element::H), 2);
        assert_eq!(water.count(Element::O), 1);
        assert_eq!(water.count(Element::C), 0);

        let salt = Composition::parse("NaCl").unwrap();
        assert_eq!(salt.count(Element::Na), 1);
        assert_eq!(salt.count(Element::Cl), 1);
    }

    #[test]
    fn parses_nested_groups() {
        let hydroxide = Composition::parse("Ca(OH)2").unwrap();
        assert_eq!(hydroxide.count(Element::Ca), 1);
        assert_eq!(hydroxide.count(Element::O), 2);
        assert_eq!(hydroxide.count(Element::H), 2);

        let complex = Composition::parse("[Cu(NH3)4]SO4").unwrap();
        assert_eq!(complex.count(Element::Cu), 1);
        assert_eq!(complex.count(Element::N), 4);
        assert_eq!(complex.count(Element::H), 12);
        assert_eq!(complex.count(Element::S), 1);
        assert_eq!(complex.count(Element::O), 4);
    }

    #[test]
    fn parses_hydrates() {
        let vitriol = Composition::parse("CuSO4·5H2O").unwrap();
        assert_eq!(vitriol.count(Element::H), 10);
        assert_eq!(vitriol.count(Element::O), 9);
        assert_eq!(vitriol, Composition::parse("CuSO4*5H2O").unwrap());
    }

    #[test]
    fn molar_mass_of_water() {
        let water = Composition::parse("H2O").unwrap();
        assert!(approx_eq(water.molar_mass(), 18.015, 1e-3));
    }

    #[test]
    fn display_uses_hill_order() {
        assert_eq!(Composition::parse("C2H5OH").unwrap().to_string(), "C2H6O");
        assert_eq!(Composition::parse("H2SO4").unwrap().to_string(), "H2O4S");
        assert_eq!(Composition::parse("NaCl").unwrap().to_string(), "ClNa");
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert_eq!(Composition::parse("  "), Err(ParseCompositionError::Empty));
        assert_eq!(
            Composition::parse("Xx2"),
            Err(ParseCompositionError::UnknownElement("Xx".into()))
        );
        assert!(matches!(
            Composition::parse("Ca(OH2"),
            Err(ParseCompositionError::UnbalancedGroup { pos: 2 })
        ));
        assert!(matches!(
            Composition::parse("Ca(OH]2"),
            Err(ParseCompositionError::UnbalancedGroup { .. })
        ));
        assert!(matches!(
            Composition::parse("h2o"),
            Err(ParseCompositionError::UnexpectedChar { ch: 'h', pos: 0 })
        ));
        assert!(matches!(
            Composition::parse("H0"),
            Err(ParseCompositionError::UnexpectedChar { ch: '0', .. })
        ));
    }

    #[test]
    fn subscript_label_keeps_hydrate_multiplier() {
        assert_eq!(subscript_label("H2O"), "H₂O");
        assert_eq!(subscript_label("Ca(OH)2"), "Ca(OH)₂");
        assert_eq!(subscript_label("CuSO4·5H2O"), "CuSO₄·5H₂O");
    }
}
