//! Static per-trajectory description of the simulated matter.
//!
//! Atoms are stored columnar in stable index order. Every atom belongs to a
//! group, a molecule and a chain; the three id columns realise the
//! atom -> group -> molecule -> chain rollup used by grouped selections.

use serde::{Deserialize, Serialize};

use crate::elements::ELEMENTS;
use crate::error::{NscatError, NscatResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLevel {
    Atom,
    Group,
    Residue,
    Chain,
    Molecule,
}

impl EntityLevel {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "atom" => Some(EntityLevel::Atom),
            "group" => Some(EntityLevel::Group),
            "residue" => Some(EntityLevel::Residue),
            "chain" => Some(EntityLevel::Chain),
            "molecule" => Some(EntityLevel::Molecule),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityLevel::Atom => "atom",
            EntityLevel::Group => "group",
            EntityLevel::Residue => "residue",
            EntityLevel::Chain => "chain",
            EntityLevel::Molecule => "molecule",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomView<'a> {
    pub index: usize,
    pub symbol: &'a str,
    pub name: &'a str,
    pub mass: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChemicalSystem {
    name: String,
    symbols: Vec<String>,
    names: Vec<String>,
    masses: Vec<f64>,
    group_ids: Vec<u32>,
    molecule_ids: Vec<u32>,
    chain_ids: Vec<u32>,
    group_names: Vec<String>,
    molecule_names: Vec<String>,
    chain_names: Vec<String>,
    bonds: Vec<(u32, u32)>,
    adjacency: Vec<Vec<u32>>,
}

impl ChemicalSystem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_atoms(&self) -> usize {
        self.symbols.len()
    }

    pub fn atom(&self, index: usize) -> AtomView<'_> {
        AtomView {
            index,
            symbol: &self.symbols[index],
            name: &self.names[index],
            mass: self.masses[index],
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn atom_names(&self) -> &[String] {
        &self.names
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn bonds(&self) -> &[(u32, u32)] {
        &self.bonds
    }

    /// Bond adjacency of one atom, in insertion order.
    pub fn neighbors(&self, atom: usize) -> &[u32] {
        &self.adjacency[atom]
    }

    /// Entity id of an atom at a grouping level. At the atom level the
    /// entity id is the atom index itself.
    pub fn parent_of(&self, level: EntityLevel, atom: usize) -> usize {
        match level {
            EntityLevel::Atom => atom,
            EntityLevel::Group | EntityLevel::Residue => self.group_ids[atom] as usize,
            EntityLevel::Molecule => self.molecule_ids[atom] as usize,
            EntityLevel::Chain => self.chain_ids[atom] as usize,
        }
    }

    pub fn entity_count(&self, level: EntityLevel) -> usize {
        match level {
            EntityLevel::Atom => self.n_atoms(),
            EntityLevel::Group | EntityLevel::Residue => self.group_names.len(),
            EntityLevel::Molecule => self.molecule_names.len(),
            EntityLevel::Chain => self.chain_names.len(),
        }
    }

    pub fn entity_label(&self, level: EntityLevel, id: usize) -> &str {
        match level {
            EntityLevel::Atom => &self.names[id],
            EntityLevel::Group | EntityLevel::Residue => &self.group_names[id],
            EntityLevel::Molecule => &self.molecule_names[id],
            EntityLevel::Chain => &self.chain_names[id],
        }
    }

    /// Atom indices belonging to one molecule, ascending.
    pub fn molecule_atoms(&self, molecule_id: usize) -> Vec<u32> {
        (0..self.n_atoms() as u32)
            .filter(|&i| self.molecule_ids[i as usize] as usize == molecule_id)
            .collect()
    }

    /// New system restricted to `indices` (must be sorted, unique, in
    /// range). Entity ids are re-compacted; bonds with an endpoint outside
    /// the subset are dropped.
    pub fn subset(&self, indices: &[u32]) -> NscatResult<ChemicalSystem> {
        let n = self.n_atoms() as u32;
        let mut remap = vec![u32::MAX; n as usize];
        for (new, &old) in indices.iter().enumerate() {
            if old >= n {
                return Err(NscatError::InputData(format!(
                    "subset index {old} out of bounds for system with {n} atoms"
                )));
            }
            remap[old as usize] = new as u32;
        }

        let mut builder = ChemicalSystemBuilder::new(&self.name);
        let mut last_chain = u32::MAX;
        let mut last_molecule = u32::MAX;
        let mut last_group = u32::MAX;
        for &old in indices {
            let old_us = old as usize;
            if self.chain_ids[old_us] != last_chain {
                last_chain = self.chain_ids[old_us];
                builder.begin_chain(&self.chain_names[last_chain as usize]);
                last_molecule = u32::MAX;
                last_group = u32::MAX;
            }
            if self.molecule_ids[old_us] != last_molecule {
                last_molecule = self.molecule_ids[old_us];
                builder.begin_molecule(&self.molecule_names[last_molecule as usize]);
                last_group = u32::MAX;
            }
            if self.group_ids[old_us] != last_group {
                last_group = self.group_ids[old_us];
                builder.begin_group(&self.group_names[last_group as usize]);
            }
            builder.add_atom_with_mass(
                &self.symbols[old_us],
                &self.names[old_us],
                self.masses[old_us],
            );
        }
        for &(a, b) in &self.bonds {
            let (na, nb) = (remap[a as usize], remap[b as usize]);
            if na != u32::MAX && nb != u32::MAX {
                builder.add_bond(na, nb);
            }
        }
        Ok(builder.build())
    }
}

/// Incremental assembler. Atoms are appended into the most recently begun
/// chain/molecule/group; defaults are created lazily so flat systems need
/// no explicit structure calls.
#[derive(Debug)]
pub struct ChemicalSystemBuilder {
    system: ChemicalSystem,
    current_group: Option<u32>,
    current_molecule: Option<u32>,
    current_chain: Option<u32>,
}

impl ChemicalSystemBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            system: ChemicalSystem {
                name: name.to_string(),
                ..ChemicalSystem::default()
            },
            current_group: None,
            current_molecule: None,
            current_chain: None,
        }
    }

    pub fn begin_chain(&mut self, label: &str) -> &mut Self {
        self.system.chain_names.push(label.to_string());
        self.current_chain = Some(self.system.chain_names.len() as u32 - 1);
        self.current_molecule = None;
        self.current_group = None;
        self
    }

    pub fn begin_molecule(&mut self, label: &str) -> &mut Self {
        self.system.molecule_names.push(label.to_string());
        self.current_molecule = Some(self.system.molecule_names.len() as u32 - 1);
        self.current_group = None;
        self
    }

    pub fn begin_group(&mut self, label: &str) -> &mut Self {
        self.system.group_names.push(label.to_string());
        self.current_group = Some(self.system.group_names.len() as u32 - 1);
        self
    }

    /// Append an atom; mass is taken from the atoms database (0.0 for an
    /// unknown symbol). Returns the atom index.
    pub fn add_atom(&mut self, symbol: &str, name: &str) -> u32 {
        let mass = ELEMENTS.weight(symbol);
        self.add_atom_with_mass(symbol, name, mass)
    }

    pub fn add_atom_with_mass(&mut self, symbol: &str, name: &str, mass: f64) -> u32 {
        if self.current_chain.is_none() {
            self.begin_chain("A");
        }
        if self.current_molecule.is_none() {
            self.begin_molecule("MOL");
        }
        if self.current_group.is_none() {
            self.begin_group("GRP");
        }
        let sys = &mut self.system;
        sys.symbols.push(symbol.to_string());
        sys.names.push(name.to_string());
        sys.masses.push(mass);
        sys.group_ids.push(self.current_group.unwrap_or(0));
        sys.molecule_ids.push(self.current_molecule.unwrap_or(0));
        sys.chain_ids.push(self.current_chain.unwrap_or(0));
        sys.symbols.len() as u32 - 1
    }

    pub fn add_bond(&mut self, a: u32, b: u32) -> &mut Self {
        self.system.bonds.push((a, b));
        self
    }

    pub fn build(mut self) -> ChemicalSystem {
        let n = self.system.n_atoms();
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in &self.system.bonds {
            if (a as usize) < n && (b as usize) < n && a != b {
                adjacency[a as usize].push(b);
                adjacency[b as usize].push(a);
            }
        }
        self.system.adjacency = adjacency;
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_dimer() -> ChemicalSystem {
        let mut b = ChemicalSystemBuilder::new("water dimer");
        for i in 0..2 {
            b.begin_molecule("WAT");
            b.begin_group("WAT");
            let o = b.add_atom("O", &format!("O{i}"));
            let h1 = b.add_atom("H", &format!("H{i}a"));
            let h2 = b.add_atom("H", &format!("H{i}b"));
            b.add_bond(o, h1);
            b.add_bond(o, h2);
        }
        b.build()
    }

    #[test]
    fn builder_assigns_parents_and_masses() {
        let sys = water_dimer();
        assert_eq!(sys.n_atoms(), 6);
        assert_eq!(sys.entity_count(EntityLevel::Molecule), 2);
        assert_eq!(sys.entity_count(EntityLevel::Chain), 1);
        assert_eq!(sys.parent_of(EntityLevel::Molecule, 0), 0);
        assert_eq!(sys.parent_of(EntityLevel::Molecule, 4), 1);
        assert!((sys.atom(0).mass - 15.999).abs() < 1e-9);
        assert!((sys.atom(1).mass - 1.0079).abs() < 1e-9);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let sys = water_dimer();
        assert_eq!(sys.neighbors(0), &[1, 2]);
        assert_eq!(sys.neighbors(1), &[0]);
        assert_eq!(sys.neighbors(3), &[4, 5]);
    }

    #[test]
    fn subset_recompacts_entities_and_bonds() {
        let sys = water_dimer();
        let sub = sys.subset(&[0, 1, 2]).unwrap();
        assert_eq!(sub.n_atoms(), 3);
        assert_eq!(sub.entity_count(EntityLevel::Molecule), 1);
        assert_eq!(sub.bonds(), &[(0, 1), (0, 2)]);
        assert_eq!(sub.atom(0).symbol, "O");
    }

    #[test]
    fn subset_rejects_out_of_range() {
        let sys = water_dimer();
        assert!(sys.subset(&[0, 99]).is_err());
    }
}
