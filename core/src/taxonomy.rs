//! Taxonomy service — the label universe behind payloads.
//!
//! Four independent hierarchies (disease, disease driver, symptom,
//! transmission route), each a flat set of leaf terms. Every term has a
//! native code such as `DOID_11729` or `NCIT_C86195` and a human label.
//!
//! The service is injected into the engine as `Arc<dyn Taxonomy>`; there
//! is no process-wide instance.

use crate::{
    codec,
    error::{CodecLookupError, SimError, SimResult},
    rng::SubsystemRng,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hierarchy {
    Disease,
    DiseaseDriver,
    Symptom,
    Transmission,
}

impl Hierarchy {
    /// Payload field order.
    pub const ALL: [Hierarchy; 4] = [
        Hierarchy::Disease,
        Hierarchy::DiseaseDriver,
        Hierarchy::Symptom,
        Hierarchy::Transmission,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disease       => "disease",
            Self::DiseaseDriver => "disease-driver",
            Self::Symptom       => "symptom",
            Self::Transmission  => "transmission",
        };
        f.write_str(s)
    }
}

/// Native code families. The driver hierarchy imports terms from four
/// source ontologies, so it spans four namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Doid,
    Disdriv,
    Chebi,
    Exo,
    Ncit,
    Symp,
    Trans,
}

impl Namespace {
    pub const ALL: [Namespace; 7] = [
        Namespace::Doid,
        Namespace::Disdriv,
        Namespace::Chebi,
        Namespace::Exo,
        Namespace::Ncit,
        Namespace::Symp,
        Namespace::Trans,
    ];

    pub fn native_prefix(self) -> &'static str {
        match self {
            Self::Doid    => "DOID_",
            Self::Disdriv => "DISDRIV_",
            Self::Chebi   => "CHEBI_",
            Self::Exo     => "ExO_",
            Self::Ncit    => "NCIT_C",
            Self::Symp    => "SYMP_",
            Self::Trans   => "TRANS_",
        }
    }

    pub fn hierarchy(self) -> Hierarchy {
        match self {
            Self::Doid => Hierarchy::Disease,
            Self::Disdriv | Self::Chebi | Self::Exo | Self::Ncit => Hierarchy::DiseaseDriver,
            Self::Symp => Hierarchy::Symptom,
            Self::Trans => Hierarchy::Transmission,
        }
    }
}

/// A term's native identifier: namespace plus the digit string after the
/// native prefix. Digits are kept as text so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermCode {
    pub namespace: Namespace,
    pub local_id:  String,
}

impl TermCode {
    pub fn new(namespace: Namespace, local_id: impl Into<String>) -> Result<Self, CodecLookupError> {
        let local_id = local_id.into();
        if local_id.is_empty() || !local_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecLookupError::MalformedCode {
                value: format!("{}{}", namespace.native_prefix(), local_id),
            });
        }
        Ok(Self { namespace, local_id })
    }
}

impl FromStr for TermCode {
    type Err = CodecLookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .iter()
            .find_map(|ns| s.strip_prefix(ns.native_prefix()).map(|rest| (*ns, rest)))
            .ok_or_else(|| CodecLookupError::MalformedCode { value: s.to_string() })
            .and_then(|(ns, rest)| TermCode::new(ns, rest))
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace.native_prefix(), self.local_id)
    }
}

/// One label per hierarchy, in payload field order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelSet {
    pub disease:      String,
    pub driver:       String,
    pub symptom:      String,
    pub transmission: String,
}

impl LabelSet {
    pub fn new(
        disease: impl Into<String>,
        driver: impl Into<String>,
        symptom: impl Into<String>,
        transmission: impl Into<String>,
    ) -> Self {
        Self {
            disease:      disease.into(),
            driver:       driver.into(),
            symptom:      symptom.into(),
            transmission: transmission.into(),
        }
    }

    pub fn get(&self, hierarchy: Hierarchy) -> &str {
        match hierarchy {
            Hierarchy::Disease       => &self.disease,
            Hierarchy::DiseaseDriver => &self.driver,
            Hierarchy::Symptom       => &self.symptom,
            Hierarchy::Transmission  => &self.transmission,
        }
    }
}

/// The lookups the simulation needs from a taxonomy backend.
pub trait Taxonomy: Send + Sync {
    /// One uniformly random leaf label from each hierarchy.
    fn sample_label_set(&self, rng: &mut SubsystemRng) -> LabelSet;

    fn label_to_code(&self, hierarchy: Hierarchy, label: &str) -> Result<TermCode, CodecLookupError>;

    /// The hierarchy is implied by the code's namespace.
    fn code_to_label(&self, code: &TermCode) -> Result<String, CodecLookupError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermEntry {
    pub id:    String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TaxonomyFile {
    disease:        Vec<TermEntry>,
    disease_driver: Vec<TermEntry>,
    symptom:        Vec<TermEntry>,
    transmission:   Vec<TermEntry>,
}

#[derive(Debug, Clone)]
struct Term {
    code:  TermCode,
    label: String,
}

#[derive(Debug, Clone, Default)]
struct HierarchyIndex {
    terms:    Vec<Term>,
    by_label: HashMap<String, usize>,
    by_code:  HashMap<TermCode, usize>,
}

/// In-memory taxonomy snapshot.
#[derive(Debug, Clone)]
pub struct TaxonomyCatalog {
    hierarchies: [HierarchyIndex; 4],
}

impl TaxonomyCatalog {
    /// Load `taxonomy/taxonomy.json` from the data directory.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/taxonomy/taxonomy.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: TaxonomyFile = serde_json::from_str(&content)?;
        let catalog = Self::from_entries([
            file.disease,
            file.disease_driver,
            file.symptom,
            file.transmission,
        ])?;
        log::info!("taxonomy: loaded {} terms from {path}", catalog.term_count());
        Ok(catalog)
    }

    /// Build from per-hierarchy entry lists in `Hierarchy::ALL` order.
    ///
    /// Rejects snapshots where a code is malformed, sits in the wrong
    /// hierarchy, repeats a label, or compacts to an integer that another
    /// term already uses. The last check keeps `expand` unambiguous.
    pub fn from_entries(entries: [Vec<TermEntry>; 4]) -> SimResult<Self> {
        let mut hierarchies: [HierarchyIndex; 4] = Default::default();
        let mut compacted: HashMap<u32, TermCode> = HashMap::new();

        for (hierarchy, list) in Hierarchy::ALL.into_iter().zip(entries) {
            if list.is_empty() {
                return Err(SimError::Config(format!("{hierarchy} hierarchy has no terms")));
            }
            let index = &mut hierarchies[hierarchy.index()];
            for entry in list {
                let code: TermCode = entry.id.parse()?;
                if code.namespace.hierarchy() != hierarchy {
                    return Err(SimError::Config(format!(
                        "term {code} listed under {hierarchy} but belongs to {}",
                        code.namespace.hierarchy()
                    )));
                }
                let value = codec::encode_term(&code)?;
                if let Some(existing) = compacted.insert(value, code.clone()) {
                    return Err(SimError::Config(format!(
                        "terms {existing} and {code} both compact to {value}"
                    )));
                }
                let pos = index.terms.len();
                if index.by_label.insert(entry.label.clone(), pos).is_some() {
                    return Err(SimError::Config(format!(
                        "duplicate {hierarchy} label '{}'",
                        entry.label
                    )));
                }
                index.by_code.insert(code.clone(), pos);
                index.terms.push(Term { code, label: entry.label });
            }
        }
        Ok(Self { hierarchies })
    }

    pub fn term_count(&self) -> usize {
        self.hierarchies.iter().map(|h| h.terms.len()).sum()
    }

    /// Every label of one hierarchy, in snapshot order.
    pub fn labels(&self, hierarchy: Hierarchy) -> impl Iterator<Item = &str> {
        self.hierarchies[hierarchy.index()]
            .terms
            .iter()
            .map(|t| t.label.as_str())
    }

    /// Small built-in snapshot for unit tests.
    pub fn default_test() -> Self {
        // Fixed table; `built_in_test_snapshot_is_valid` keeps this arm unreachable.
        match Self::from_entries(Self::default_test_snapshot()) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in test taxonomy is invalid: {e}"),
        }
    }

    fn default_test_snapshot() -> [Vec<TermEntry>; 4] {
        fn entries(list: &[(&str, &str)]) -> Vec<TermEntry> {
            list.iter()
                .map(|(id, label)| TermEntry { id: (*id).into(), label: (*label).into() })
                .collect()
        }
        [
            entries(&[
                ("DOID_11729", "Lyme disease"),
                ("DOID_0050589", "inflammatory bowel disease"),
                ("DOID_9352", "type 2 diabetes mellitus"),
                ("DOID_12365", "malaria"),
                ("DOID_0080600", "COVID-19"),
            ]),
            entries(&[
                ("NCIT_C86195", "BorreliaBurgdorferi"),
                ("DISDRIV_4", "alcohol consumption"),
                ("CHEBI_25212", "metabolite"),
                ("ExO_0000002", "exposure stressor"),
                ("NCIT_C17934", "smoking"),
            ]),
            entries(&[
                ("SYMP_0000613", "Fever"),
                ("SYMP_0000570", "cough"),
                ("SYMP_0019177", "fatigue"),
                ("SYMP_0000064", "headache"),
            ]),
            entries(&[
                ("TRANS_0000011", "TickBite"),
                ("TRANS_0000018", "airborne transmission"),
                ("TRANS_0000006", "blood-borne transmission"),
            ]),
        ]
    }
}

impl Taxonomy for TaxonomyCatalog {
    fn sample_label_set(&self, rng: &mut SubsystemRng) -> LabelSet {
        let mut pick = |h: Hierarchy| {
            let terms = &self.hierarchies[h.index()].terms;
            terms[rng.pick_index(terms.len())].label.clone()
        };
        let disease = pick(Hierarchy::Disease);
        let driver = pick(Hierarchy::DiseaseDriver);
        let symptom = pick(Hierarchy::Symptom);
        let transmission = pick(Hierarchy::Transmission);
        LabelSet { disease, driver, symptom, transmission }
    }

    fn label_to_code(&self, hierarchy: Hierarchy, label: &str) -> Result<TermCode, CodecLookupError> {
        let index = &self.hierarchies[hierarchy.index()];
        index
            .by_label
            .get(label)
            .map(|&pos| index.terms[pos].code.clone())
            .ok_or_else(|| CodecLookupError::UnknownLabel {
                hierarchy,
                label: label.to_string(),
            })
    }

    fn code_to_label(&self, code: &TermCode) -> Result<String, CodecLookupError> {
        let hierarchy = code.namespace.hierarchy();
        let index = &self.hierarchies[hierarchy.index()];
        index
            .by_code
            .get(code)
            .map(|&pos| index.terms[pos].label.clone())
            .ok_or_else(|| CodecLookupError::UnknownCode {
                hierarchy,
                code: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, SubsystemSlot};

    #[test]
    fn parses_native_codes_with_leading_zeros() {
        let code: TermCode = "DOID_0050589".parse().unwrap();
        assert_eq!(code.namespace, Namespace::Doid);
        assert_eq!(code.local_id, "0050589");
        assert_eq!(code.to_string(), "DOID_0050589");

        let ncit: TermCode = "NCIT_C86195".parse().unwrap();
        assert_eq!(ncit.namespace, Namespace::Ncit);
        assert_eq!(ncit.local_id, "86195");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!("FOO_123".parse::<TermCode>().is_err());
        assert!("DOID_".parse::<TermCode>().is_err());
        assert!("SYMP_12a".parse::<TermCode>().is_err());
    }

    #[test]
    fn built_in_test_snapshot_is_valid() {
        let catalog = TaxonomyCatalog::from_entries(TaxonomyCatalog::default_test_snapshot()).unwrap();
        for hierarchy in Hierarchy::ALL {
            assert!(catalog.labels(hierarchy).next().is_some(), "{hierarchy:?} is empty");
        }
    }

    #[test]
    fn label_and_code_lookups_are_inverse() {
        let catalog = TaxonomyCatalog::default_test();
        let code = catalog.label_to_code(Hierarchy::Symptom, "Fever").unwrap();
        assert_eq!(code.to_string(), "SYMP_0000613");
        assert_eq!(catalog.code_to_label(&code).unwrap(), "Fever");
    }

    #[test]
    fn unknown_label_is_a_lookup_error() {
        let catalog = TaxonomyCatalog::default_test();
        let err = catalog.label_to_code(Hierarchy::Disease, "Fever").unwrap_err();
        assert!(matches!(err, CodecLookupError::UnknownLabel { hierarchy: Hierarchy::Disease, .. }));
    }

    #[test]
    fn term_in_wrong_hierarchy_is_rejected() {
        let mut snapshot: [Vec<TermEntry>; 4] = Default::default();
        for list in snapshot.iter_mut() {
            list.push(TermEntry { id: "DOID_1".into(), label: "x".into() });
        }
        assert!(matches!(
            TaxonomyCatalog::from_entries(snapshot),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn colliding_compacted_ids_are_rejected() {
        // DOID_1 → 11 and DOID_01 → 101 are distinct, but two driver terms
        // with the same local id in the same namespace are not.
        let snapshot = [
            vec![TermEntry { id: "DOID_1".into(), label: "a".into() }],
            vec![
                TermEntry { id: "CHEBI_7".into(), label: "b".into() },
                TermEntry { id: "CHEBI_7".into(), label: "c".into() },
            ],
            vec![TermEntry { id: "SYMP_1".into(), label: "d".into() }],
            vec![TermEntry { id: "TRANS_1".into(), label: "e".into() }],
        ];
        let err = TaxonomyCatalog::from_entries(snapshot).unwrap_err();
        assert!(err.to_string().contains("both compact to 37"), "{err}");
    }

    #[test]
    fn sampled_labels_come_from_their_hierarchies() {
        let catalog = TaxonomyCatalog::default_test();
        let bank = RngBank::new(7);
        let mut rng = bank.for_subsystem(SubsystemSlot::Population);
        for _ in 0..50 {
            let set = catalog.sample_label_set(&mut rng);
            for h in Hierarchy::ALL {
                assert!(catalog.labels(h).any(|l| l == set.get(h)));
            }
        }
    }
}
