//! Element symbol to atomic id lookup.
//!
//! The reference site keys each clickable element tile by its atomic number,
//! so resolving a symbol is a fixed table lookup. No fuzzy matching.

/// Element symbols in periodic table order; index + 1 is the atomic number.
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// First character upper-cased, the rest lower-cased (`"fE"` -> `"Fe"`).
///
/// This is also the cache key for a symbol.
pub fn capitalize(symbol: &str) -> String {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Atomic number for a symbol, case-insensitive.
pub fn atomic_number(symbol: &str) -> Option<u32> {
    let symbol = capitalize(symbol);
    SYMBOLS
        .iter()
        .position(|s| *s == symbol)
        .map(|i| i as u32 + 1)
}

/// Atomic id as the site renders it (decimal string), or `None` for anything
/// outside the table.
pub fn atomic_id(symbol: &str) -> Option<String> {
    atomic_number(symbol).map(|n| n.to_string())
}

/// Symbol for an atomic number.
pub fn symbol_for(number: u32) -> Option<&'static str> {
    let index = usize::try_from(number).ok()?.checked_sub(1)?;
    SYMBOLS.get(index).copied()
}

/// All known symbols in atomic number order.
pub fn symbols() -> &'static [&'static str] {
    &SYMBOLS
}
