//! Selection-shaped configurators: the atom selection itself and the
//! kinds that rewrite it (grouping rollup, transmutation) or derive
//! per-atom data from it (partial charges, weighting schemes).

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use nscat_core::{AtomsDatabase, EntityLevel, Selector};

use crate::configurable::Configuration;
use crate::context::SetupContext;
use crate::value;

fn default_trajectory_param() -> String {
    "trajectory".to_string()
}

fn default_selection_param() -> String {
    "atom_selection".to_string()
}

fn default_all() -> Value {
    serde_json::json!({"all": true})
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtomSelectionOptions {
    pub default: Value,
    pub trajectory: String,
}

impl Default for AtomSelectionOptions {
    fn default() -> Self {
        Self {
            default: default_all(),
            trajectory: default_trajectory_param(),
        }
    }
}

/// A configured selection. Initially one group per selected atom; the
/// grouping-level configurator may later coarsen the partition, and the
/// transmutation configurator may rewrite element identities. `names` are
/// the labels weighting is keyed on: element symbols at atom level,
/// entity labels after a rollup.
#[derive(Debug, Clone)]
pub struct AtomSelectionConfigurator {
    pub options: AtomSelectionOptions,
    pub indexes: Vec<Vec<u32>>,
    pub flatten_indexes: Vec<u32>,
    pub elements: Vec<Vec<String>>,
    pub names: Vec<Vec<String>>,
    pub masses: Vec<Vec<f64>>,
    pub unique_names: Vec<String>,
    pub selection_length: usize,
    pub level: EntityLevel,
}

impl AtomSelectionConfigurator {
    pub fn new(options: AtomSelectionOptions) -> Self {
        Self {
            options,
            indexes: Vec::new(),
            flatten_indexes: Vec::new(),
            elements: Vec::new(),
            names: Vec::new(),
            masses: Vec::new(),
            unique_names: Vec::new(),
            selection_length: 0,
            level: EntityLevel::Atom,
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let system = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?
            .instance()?
            .system_arc();

        // A selector spec may arrive as an object or a JSON-encoded string.
        let owned;
        let spec = match raw {
            Some(Value::String(text)) => {
                owned = serde_json::from_str::<Value>(text)
                    .map_err(|e| format!("selection is not valid JSON: {e}"))?;
                &owned
            }
            Some(other) => other,
            None => &self.options.default,
        };

        let selector = Selector::from_json(&system, spec)?;
        let flatten = selector.into_idxs();

        self.indexes = flatten.iter().map(|&i| vec![i]).collect();
        self.elements = flatten
            .iter()
            .map(|&i| vec![system.atom(i as usize).symbol.to_string()])
            .collect();
        self.names = self.elements.clone();
        self.masses = flatten
            .iter()
            .map(|&i| vec![system.atom(i as usize).mass])
            .collect();
        self.unique_names = unique_labels(&self.names);
        self.selection_length = flatten.len();
        self.flatten_indexes = flatten;
        self.level = EntityLevel::Atom;
        Ok(())
    }

    /// Label a group is keyed on for weighting and per-element curves.
    pub fn group_label(&self, group: usize) -> &str {
        &self.names[group][0]
    }

    pub fn n_groups(&self) -> usize {
        self.indexes.len()
    }

    pub fn information(&self) -> String {
        format!(
            "{} atoms in {} groups ({} level)",
            self.selection_length,
            self.indexes.len(),
            self.level.name()
        )
    }
}

fn unique_labels(names: &[Vec<String>]) -> Vec<String> {
    let mut unique = Vec::new();
    for group in names {
        for label in group {
            if !unique.contains(label) {
                unique.push(label.clone());
            }
        }
    }
    unique
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupingLevelOptions {
    pub default: String,
    pub trajectory: String,
    pub atom_selection: String,
}

impl Default for GroupingLevelOptions {
    fn default() -> Self {
        Self {
            default: "atom".to_string(),
            trajectory: default_trajectory_param(),
            atom_selection: default_selection_param(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupingLevelConfigurator {
    pub options: GroupingLevelOptions,
    pub level: EntityLevel,
}

impl GroupingLevelConfigurator {
    pub fn new(options: GroupingLevelOptions) -> Self {
        Self {
            options,
            level: EntityLevel::Atom,
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![
            ("trajectory", self.options.trajectory.clone()),
            ("atom_selection", self.options.atom_selection.clone()),
        ]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let token = match raw {
            Some(raw) => value::as_str(raw)?.to_string(),
            None => self.options.default.clone(),
        };
        let level = EntityLevel::parse(&token)
            .ok_or_else(|| format!("unknown grouping level '{token}'"))?;
        self.level = level;
        if level == EntityLevel::Atom {
            return Ok(());
        }

        let system = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?
            .instance()?
            .system_arc();
        let selection = deps
            .atom_selection_mut(&self.options.atom_selection)
            .map_err(|e| e.to_string())?;

        // Partition the selected atoms by their parent entity, ascending
        // entity id; members stay sorted because flatten_indexes is.
        let mut partition: IndexMap<usize, Vec<u32>> = IndexMap::new();
        for &atom in &selection.flatten_indexes {
            let entity = system.parent_of(level, atom as usize);
            partition.entry(entity).or_default().push(atom);
        }
        partition.sort_keys();

        let mut indexes = Vec::with_capacity(partition.len());
        let mut elements = Vec::with_capacity(partition.len());
        let mut names = Vec::with_capacity(partition.len());
        let mut masses = Vec::with_capacity(partition.len());
        for (entity, members) in partition {
            elements.push(
                members
                    .iter()
                    .map(|&i| system.atom(i as usize).symbol.to_string())
                    .collect(),
            );
            masses.push(members.iter().map(|&i| system.atom(i as usize).mass).collect());
            names.push(vec![system.entity_label(level, entity).to_string()]);
            indexes.push(members);
        }
        selection.indexes = indexes;
        selection.elements = elements;
        selection.names = names;
        selection.masses = masses;
        selection.unique_names = unique_labels(&selection.names);
        selection.level = level;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("level: {}", self.level.name())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtomTransmutationOptions {
    pub default: Value,
    pub trajectory: String,
    pub atom_selection: String,
}

impl Default for AtomTransmutationOptions {
    fn default() -> Self {
        Self {
            default: serde_json::json!({}),
            trajectory: default_trajectory_param(),
            atom_selection: default_selection_param(),
        }
    }
}

/// Replaces the element identity of selected atoms at analysis time,
/// rewriting the selection's elements, labels and masses in place.
#[derive(Debug, Clone)]
pub struct AtomTransmutationConfigurator {
    pub options: AtomTransmutationOptions,
    pub transmutations: Vec<(u32, String)>,
}

impl AtomTransmutationConfigurator {
    pub fn new(options: AtomTransmutationOptions) -> Self {
        Self {
            options,
            transmutations: Vec::new(),
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![
            ("trajectory", self.options.trajectory.clone()),
            ("atom_selection", self.options.atom_selection.clone()),
        ]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = raw.unwrap_or(&self.options.default);
        let map = spec
            .as_object()
            .ok_or_else(|| "transmutation spec must map atom index to element".to_string())?;

        let n_atoms = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?
            .instance()?
            .chemical_system()
            .n_atoms() as u32;

        let mut transmutations = Vec::with_capacity(map.len());
        for (key, target) in map {
            let index: u32 = key
                .parse()
                .map_err(|_| format!("'{key}' is not an atom index"))?;
            if index >= n_atoms {
                return Err(format!("atom index {index} out of bounds ({n_atoms} atoms)"));
            }
            let symbol = value::as_str(target)?;
            if !ctx.elements.contains(symbol) {
                return Err(format!("unknown element '{symbol}'"));
            }
            transmutations.push((index, symbol.to_string()));
        }

        let selection = deps
            .atom_selection_mut(&self.options.atom_selection)
            .map_err(|e| e.to_string())?;
        for (index, symbol) in &transmutations {
            let mass = ctx.elements.weight(symbol);
            for (g, group) in selection.indexes.iter().enumerate() {
                for (p, &atom) in group.iter().enumerate() {
                    if atom == *index {
                        selection.elements[g][p] = symbol.clone();
                        selection.masses[g][p] = mass;
                        if selection.level == EntityLevel::Atom {
                            selection.names[g][p] = symbol.clone();
                        }
                    }
                }
            }
        }
        selection.unique_names = unique_labels(&selection.names);
        self.transmutations = transmutations;
        Ok(())
    }

    pub fn information(&self) -> String {
        format!("{} atoms transmuted", self.transmutations.len())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialChargeOptions {
    pub default: Value,
    pub trajectory: String,
}

impl Default for PartialChargeOptions {
    fn default() -> Self {
        Self {
            default: serde_json::json!({}),
            trajectory: default_trajectory_param(),
        }
    }
}

/// Per-atom partial charges, zero-filled for unspecified atoms.
#[derive(Debug, Clone)]
pub struct PartialChargeConfigurator {
    pub options: PartialChargeOptions,
    pub charges: Vec<f64>,
}

impl PartialChargeConfigurator {
    pub fn new(options: PartialChargeOptions) -> Self {
        Self {
            options,
            charges: Vec::new(),
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("trajectory", self.options.trajectory.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        _ctx: &SetupContext,
    ) -> Result<(), String> {
        let spec = raw.unwrap_or(&self.options.default);
        let map = spec
            .as_object()
            .ok_or_else(|| "partial charges must map atom index to charge".to_string())?;
        let n_atoms = deps
            .trajectory(&self.options.trajectory)
            .map_err(|e| e.to_string())?
            .instance()?
            .chemical_system()
            .n_atoms();

        let mut charges = vec![0.0; n_atoms];
        for (key, charge) in map {
            let index: usize = key
                .parse()
                .map_err(|_| format!("'{key}' is not an atom index"))?;
            if index >= n_atoms {
                return Err(format!("atom index {index} out of bounds ({n_atoms} atoms)"));
            }
            charges[index] = value::as_f64(charge)?;
        }
        self.charges = charges;
        Ok(())
    }

    pub fn information(&self) -> String {
        let assigned = self.charges.iter().filter(|c| **c != 0.0).count();
        format!("{assigned} non-zero charges")
    }
}

fn default_equal() -> String {
    "equal".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightsOptions {
    pub default: String,
    pub atom_selection: String,
}

impl Default for WeightsOptions {
    fn default() -> Self {
        Self {
            default: default_equal(),
            atom_selection: default_selection_param(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightsConfigurator {
    pub options: WeightsOptions,
    pub property: String,
}

impl WeightsConfigurator {
    pub fn new(options: WeightsOptions) -> Self {
        Self {
            options,
            property: String::new(),
        }
    }

    pub fn dependencies(&self) -> Vec<(&'static str, String)> {
        vec![("atom_selection", self.options.atom_selection.clone())]
    }

    pub(crate) fn apply(
        &mut self,
        raw: Option<&Value>,
        deps: &mut Configuration,
        ctx: &SetupContext,
    ) -> Result<(), String> {
        let property = match raw {
            Some(raw) => value::as_str(raw)?.to_string(),
            None => self.options.default.clone(),
        };
        if !ctx.elements.has_property(&property) {
            return Err(format!("unknown weighting property '{property}'"));
        }
        // The selection must be sound even though the weights themselves
        // are computed lazily in get_weights.
        deps.atom_selection(&self.options.atom_selection)
            .map_err(|e| e.to_string())?;
        self.property = property;
        Ok(())
    }

    /// Weight per group label: the property summed over a group's members,
    /// averaged over the groups carrying the same label. Exact under
    /// heterogeneous group sizes; reduces to the plain per-element property
    /// for atom-level selections.
    pub fn get_weights(
        &self,
        selection: &AtomSelectionConfigurator,
        elements: &AtomsDatabase,
    ) -> IndexMap<String, f64> {
        let mut sums: IndexMap<String, (f64, usize)> = IndexMap::new();
        for (g, members) in selection.elements.iter().enumerate() {
            let label = selection.group_label(g).to_string();
            let group_weight: f64 = members
                .iter()
                .map(|symbol| elements.property(symbol, &self.property).unwrap_or(0.0))
                .sum();
            let entry = sums.entry(label).or_insert((0.0, 0));
            entry.0 += group_weight;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(label, (sum, count))| (label, sum / count as f64))
            .collect()
    }

    pub fn information(&self) -> String {
        format!("weighting property: {}", self.property)
    }
}
