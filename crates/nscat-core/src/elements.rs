//! Process-wide read-only table of per-element properties.
//!
//! Scattering lengths are in fm, cross sections in barn, radii in angstrom,
//! atomic weights in g/mol. The `equal` pseudo-property is 1.0 for every
//! element and gives unweighted averages when used as a weighting scheme.

use std::sync::LazyLock;

use fxhash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRecord {
    pub symbol: &'static str,
    pub name: &'static str,
    pub atomic_number: u32,
    pub atomic_weight: f64,
    pub covalent_radius: f64,
    pub vdw_radius: f64,
    pub b_coherent: f64,
    pub b_incoherent: f64,
    pub xs_coherent: f64,
    pub xs_incoherent: f64,
    pub xs_scattering: f64,
    pub xs_absorption: f64,
}

const PROPERTY_NAMES: &[&str] = &[
    "atomic_number",
    "atomic_weight",
    "covalent_radius",
    "vdw_radius",
    "b_coherent",
    "b_incoherent",
    "xs_coherent",
    "xs_incoherent",
    "xs_scattering",
    "xs_absorption",
    "equal",
];

macro_rules! element {
    ($sym:literal, $name:literal, $z:literal, $w:literal, $cov:literal, $vdw:literal,
     $bc:literal, $bi:literal, $xc:literal, $xi:literal, $xa:literal) => {
        ElementRecord {
            symbol: $sym,
            name: $name,
            atomic_number: $z,
            atomic_weight: $w,
            covalent_radius: $cov,
            vdw_radius: $vdw,
            b_coherent: $bc,
            b_incoherent: $bi,
            xs_coherent: $xc,
            xs_incoherent: $xi,
            xs_scattering: $xc + $xi,
            xs_absorption: $xa,
        }
    };
}

// Neutron data after Sears, Neutron News 3 (1992); radii from standard
// crystallographic tables. D is a first-class entry so transmutation to
// deuterium works without isotope plumbing.
static RECORDS: &[ElementRecord] = &[
    element!("H", "hydrogen", 1, 1.0079, 0.31, 1.20, -3.739, 25.274, 1.7568, 80.26, 0.3326),
    element!("D", "deuterium", 1, 2.0141, 0.31, 1.20, 6.671, 4.04, 5.592, 2.05, 0.000519),
    element!("He", "helium", 2, 4.0026, 0.28, 1.40, 3.26, 0.0, 1.34, 0.0, 0.00747),
    element!("Li", "lithium", 3, 6.94, 1.28, 1.82, -1.90, -2.49, 0.454, 0.92, 70.5),
    element!("B", "boron", 5, 10.81, 0.84, 1.92, 5.30, 0.0, 3.54, 1.70, 767.0),
    element!("C", "carbon", 6, 12.011, 0.76, 1.70, 6.6460, 0.0, 5.551, 0.001, 0.0035),
    element!("N", "nitrogen", 7, 14.007, 0.71, 1.55, 9.36, 2.0, 11.01, 0.50, 1.90),
    element!("O", "oxygen", 8, 15.999, 0.66, 1.52, 5.803, 0.0, 4.232, 0.0008, 0.00019),
    element!("F", "fluorine", 9, 18.998, 0.57, 1.47, 5.654, -0.082, 4.017, 0.0008, 0.0096),
    element!("Na", "sodium", 11, 22.990, 1.66, 2.27, 3.63, 3.59, 1.66, 1.62, 0.53),
    element!("Mg", "magnesium", 12, 24.305, 1.41, 1.73, 5.375, 0.0, 3.631, 0.08, 0.063),
    element!("Al", "aluminium", 13, 26.982, 1.21, 1.84, 3.449, 0.256, 1.495, 0.0082, 0.231),
    element!("Si", "silicon", 14, 28.085, 1.11, 2.10, 4.1491, 0.0, 2.163, 0.004, 0.171),
    element!("P", "phosphorus", 15, 30.974, 1.07, 1.80, 5.13, 0.2, 3.307, 0.005, 0.172),
    element!("S", "sulfur", 16, 32.06, 1.05, 1.80, 2.847, 0.0, 1.0186, 0.007, 0.53),
    element!("Cl", "chlorine", 17, 35.45, 1.02, 1.75, 9.577, 0.0, 11.5257, 5.3, 33.5),
    element!("Ar", "argon", 18, 39.948, 1.06, 1.88, 1.909, 0.0, 0.458, 0.225, 0.675),
    element!("K", "potassium", 19, 39.098, 2.03, 2.75, 3.67, 0.0, 1.69, 0.27, 2.1),
    element!("Ca", "calcium", 20, 40.078, 1.76, 2.31, 4.70, 0.0, 2.78, 0.05, 0.43),
    element!("Ti", "titanium", 22, 47.867, 1.60, 2.15, -3.438, 0.0, 1.485, 2.87, 6.09),
    element!("Cr", "chromium", 24, 51.996, 1.39, 2.05, 3.635, 0.0, 1.66, 1.83, 3.05),
    element!("Mn", "manganese", 25, 54.938, 1.39, 2.05, -3.73, 1.79, 1.75, 0.40, 13.3),
    element!("Fe", "iron", 26, 55.845, 1.32, 2.04, 9.45, 0.0, 11.22, 0.40, 2.56),
    element!("Ni", "nickel", 28, 58.693, 1.24, 1.63, 10.3, 0.0, 13.3, 5.2, 4.49),
    element!("Cu", "copper", 29, 63.546, 1.32, 1.40, 7.718, 0.0, 7.485, 0.55, 3.78),
    element!("Zn", "zinc", 30, 65.38, 1.22, 1.39, 5.680, 0.0, 4.054, 0.077, 1.11),
    element!("Se", "selenium", 34, 78.971, 1.20, 1.90, 7.970, 0.0, 7.98, 0.32, 11.7),
    element!("Br", "bromine", 35, 79.904, 1.20, 1.85, 6.795, 0.0, 5.80, 0.10, 6.9),
    element!("I", "iodine", 53, 126.904, 1.39, 1.98, 5.28, 1.58, 3.50, 0.31, 6.15),
    element!("Au", "gold", 79, 196.967, 1.36, 1.66, 7.63, -1.84, 7.32, 0.43, 98.65),
    element!("Pb", "lead", 82, 207.2, 1.46, 2.02, 9.405, 0.0, 11.115, 0.003, 0.171),
];

#[derive(Debug)]
pub struct AtomsDatabase {
    index: FxHashMap<&'static str, usize>,
}

impl AtomsDatabase {
    fn new() -> Self {
        let mut index = FxHashMap::default();
        for (i, rec) in RECORDS.iter().enumerate() {
            index.insert(rec.symbol, i);
        }
        Self { index }
    }

    pub fn get(&self, symbol: &str) -> Option<&'static ElementRecord> {
        self.index.get(symbol).map(|&i| &RECORDS[i])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Numeric property by name string, the lookup the weighting schemes
    /// are built on. Unknown symbol or property name yields `None`.
    pub fn property(&self, symbol: &str, property: &str) -> Option<f64> {
        if property == "equal" {
            return self.get(symbol).map(|_| 1.0);
        }
        let rec = self.get(symbol)?;
        match property {
            "atomic_number" => Some(rec.atomic_number as f64),
            "atomic_weight" => Some(rec.atomic_weight),
            "covalent_radius" => Some(rec.covalent_radius),
            "vdw_radius" => Some(rec.vdw_radius),
            "b_coherent" => Some(rec.b_coherent),
            "b_incoherent" => Some(rec.b_incoherent),
            "xs_coherent" => Some(rec.xs_coherent),
            "xs_incoherent" => Some(rec.xs_incoherent),
            "xs_scattering" => Some(rec.xs_scattering),
            "xs_absorption" => Some(rec.xs_absorption),
            _ => None,
        }
    }

    pub fn has_property(&self, property: &str) -> bool {
        PROPERTY_NAMES.contains(&property)
    }

    pub fn property_names(&self) -> &'static [&'static str] {
        PROPERTY_NAMES
    }

    /// Atomic weight for a symbol, 0.0 for unknown elements.
    pub fn weight(&self, symbol: &str) -> f64 {
        self.get(symbol).map(|r| r.atomic_weight).unwrap_or(0.0)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &'static str> + '_ {
        RECORDS.iter().map(|r| r.symbol)
    }
}

pub static ELEMENTS: LazyLock<AtomsDatabase> = LazyLock::new(AtomsDatabase::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrogen_and_deuterium_are_distinct() {
        let h = ELEMENTS.get("H").unwrap();
        let d = ELEMENTS.get("D").unwrap();
        assert_eq!(h.atomic_number, d.atomic_number);
        assert!((h.atomic_weight - 1.0079).abs() < 1e-12);
        assert!((d.atomic_weight - 2.0141).abs() < 1e-12);
        assert!(d.b_coherent > 0.0 && h.b_coherent < 0.0);
    }

    #[test]
    fn property_lookup_by_name() {
        assert!((ELEMENTS.property("O", "xs_coherent").unwrap() - 4.232).abs() < 1e-12);
        assert!((ELEMENTS.property("C", "equal").unwrap() - 1.0).abs() < 1e-12);
        assert!(ELEMENTS.property("O", "no_such_property").is_none());
        assert!(ELEMENTS.property("Xx", "atomic_weight").is_none());
    }

    #[test]
    fn scattering_cross_section_is_coherent_plus_incoherent() {
        for symbol in ["H", "D", "C", "O", "Fe"] {
            let rec = ELEMENTS.get(symbol).unwrap();
            assert!((rec.xs_scattering - (rec.xs_coherent + rec.xs_incoherent)).abs() < 1e-9);
        }
    }

    #[test]
    fn property_names_cover_equal() {
        assert!(ELEMENTS.has_property("equal"));
        assert!(ELEMENTS.has_property("b_incoherent"));
        assert!(!ELEMENTS.has_property("color"));
    }
}
