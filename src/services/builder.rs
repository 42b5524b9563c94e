//! Code-set build strategies and deduplication
//!
//! Three interchangeable strategies over a shared anchor set, followed by a
//! single deduplication pass. An anchor id absent from the store contributes
//! zero rows; it never aborts the batch.

use crate::{
    db::VocabularyStore,
    models::{
        concept::{domain, rel},
        BuildParams, BuildType, CodeSetRow, ComboClass, ComboFilter, Concept, DrugAttributes,
        LabAttributes,
    },
    services::{policy::DomainPolicy, with_fallback},
    Error, Result,
};
use std::collections::HashSet;

/// Separator used when one anchor carries several values for one attribute.
pub const ATTRIBUTE_JOIN: &str = ", ";

#[derive(Clone)]
pub struct BuilderService<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> BuilderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn build(
        &self,
        anchor_ids: &[i64],
        build_type: BuildType,
        params: &BuildParams,
    ) -> Result<Vec<CodeSetRow>> {
        if anchor_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "anchor set must not be empty".to_string(),
            ));
        }

        let anchors = self.store.concepts_by_ids(anchor_ids).await?;
        if anchors.len() < anchor_ids.len() {
            tracing::debug!(
                requested = anchor_ids.len(),
                found = anchors.len(),
                "anchors missing from the vocabulary store contribute zero rows"
            );
        }

        let rows = match build_type {
            BuildType::Hierarchical => self.build_hierarchical(&anchors, params).await?,
            BuildType::Direct => build_direct(&anchors),
            BuildType::LabTest => self.build_labtest(&anchors).await?,
        };

        Ok(dedupe(rows))
    }

    /// Full descendant closure per anchor, no depth limit. Drug-domain
    /// descendants carry dose form, drug family group and combination class,
    /// and the combo filter drops non-matching rows entirely.
    async fn build_hierarchical(
        &self,
        anchors: &[Concept],
        params: &BuildParams,
    ) -> Result<Vec<CodeSetRow>> {
        let mut rows = Vec::new();

        for anchor in anchors {
            let descendants = with_fallback("descendants_of", || {
                self.store.descendants_of(anchor.concept_id)
            })
            .await?;

            let is_drug = anchor.domain_id == domain::DRUG;

            for (concept, _separation) in descendants {
                if !DomainPolicy::admits(&anchor.domain_id, &concept) {
                    continue;
                }

                let drug = if is_drug {
                    Some(self.drug_attributes(concept.concept_id).await?)
                } else {
                    None
                };

                rows.push(child_row(&anchor.concept_name, &concept, drug, None));
            }
        }

        apply_combo_filter(&mut rows, params.combo_filter);
        Ok(rows)
    }

    /// Anchors enriched with lab attribute values and panel memberships.
    /// Several values of one attribute join into a single string, not
    /// several rows.
    async fn build_labtest(&self, anchors: &[Concept]) -> Result<Vec<CodeSetRow>> {
        let mut rows = Vec::with_capacity(anchors.len());

        for anchor in anchors {
            let lab = LabAttributes {
                property: self.joined_attribute(anchor.concept_id, rel::HAS_PROPERTY).await?,
                scale: self.joined_attribute(anchor.concept_id, rel::HAS_SCALE).await?,
                system: self.joined_attribute(anchor.concept_id, rel::HAS_SYSTEM).await?,
                time_aspect: self
                    .joined_attribute(anchor.concept_id, rel::HAS_TIME_ASPECT)
                    .await?,
                panels: self
                    .joined_attribute(anchor.concept_id, rel::CONTAINED_IN_PANEL)
                    .await?,
            };

            rows.push(child_row(&anchor.concept_name, anchor, None, Some(lab)));
        }

        Ok(rows)
    }

    async fn drug_attributes(&self, concept_id: i64) -> Result<DrugAttributes> {
        let dose_form = self
            .store
            .related_concepts(concept_id, rel::HAS_DOSE_FORM)
            .await?
            .into_iter()
            .next()
            .map(|c| c.concept_name);

        let drug_family_group = self
            .store
            .related_concepts(concept_id, rel::HAS_DRUG_CLASS)
            .await?
            .into_iter()
            .next()
            .map(|c| c.concept_name);

        let ingredients = self
            .store
            .related_concepts(concept_id, rel::HAS_INGREDIENT)
            .await?;
        let combo_class = if ingredients.len() > 1 {
            ComboClass::Combination
        } else {
            ComboClass::Single
        };

        Ok(DrugAttributes {
            dose_form,
            drug_family_group,
            combo_class,
        })
    }

    /// Distinct target names of one relationship kind, joined in sorted
    /// order so repeated builds produce identical strings.
    async fn joined_attribute(
        &self,
        concept_id: i64,
        relationship_id: &str,
    ) -> Result<Option<String>> {
        let mut names: Vec<String> = self
            .store
            .related_concepts(concept_id, relationship_id)
            .await?
            .into_iter()
            .map(|c| c.concept_name)
            .collect();

        if names.is_empty() {
            return Ok(None);
        }

        names.sort();
        names.dedup();
        Ok(Some(names.join(ATTRIBUTE_JOIN)))
    }
}

fn build_direct(anchors: &[Concept]) -> Vec<CodeSetRow> {
    anchors
        .iter()
        .map(|anchor| child_row(&anchor.concept_name, anchor, None, None))
        .collect()
}

fn child_row(
    root_name: &str,
    concept: &Concept,
    drug: Option<DrugAttributes>,
    lab: Option<LabAttributes>,
) -> CodeSetRow {
    CodeSetRow {
        root_name: root_name.to_string(),
        child_vocabulary_id: concept.vocabulary_id.clone(),
        child_code: concept.concept_code.clone(),
        child_name: concept.concept_name.clone(),
        child_concept_id: concept.concept_id,
        concept_class_id: concept.concept_class_id.clone(),
        drug,
        lab,
    }
}

/// Post-filter on drug combination class; rows without drug attributes are
/// untouched.
fn apply_combo_filter(rows: &mut Vec<CodeSetRow>, filter: ComboFilter) {
    let keep = match filter {
        ComboFilter::All => return,
        ComboFilter::Single => ComboClass::Single,
        ComboFilter::Combination => ComboClass::Combination,
    };

    rows.retain(|row| match &row.drug {
        Some(attributes) => attributes.combo_class == keep,
        None => true,
    });
}

/// Keyed on (vocabulary, code, name, concept id, class); first occurrence
/// wins.
fn dedupe(mut rows: Vec<CodeSetRow>) -> Vec<CodeSetRow> {
    let mut seen = HashSet::new();
    rows.retain(|row| seen.insert(row.dedup_key()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(concept_id: i64, code: &str, combo_class: Option<ComboClass>) -> CodeSetRow {
        CodeSetRow {
            root_name: "root".to_string(),
            child_vocabulary_id: "RxNorm".to_string(),
            child_code: code.to_string(),
            child_name: format!("concept {concept_id}"),
            child_concept_id: concept_id,
            concept_class_id: "Clinical Drug".to_string(),
            drug: combo_class.map(|combo_class| DrugAttributes {
                dose_form: None,
                drug_family_group: None,
                combo_class,
            }),
            lab: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let rows = vec![row(1, "a", None), row(2, "b", None), row(1, "a", None)];
        let deduped = dedupe(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].child_concept_id, 1);
        assert_eq!(deduped[1].child_concept_id, 2);
    }

    #[test]
    fn combo_filter_single_drops_combinations() {
        let mut rows = vec![
            row(1, "a", Some(ComboClass::Single)),
            row(2, "b", Some(ComboClass::Combination)),
            row(3, "c", None),
        ];
        apply_combo_filter(&mut rows, ComboFilter::Single);

        let ids: Vec<i64> = rows.iter().map(|r| r.child_concept_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn combo_filter_all_keeps_everything() {
        let mut rows = vec![
            row(1, "a", Some(ComboClass::Single)),
            row(2, "b", Some(ComboClass::Combination)),
        ];
        apply_combo_filter(&mut rows, ComboFilter::All);
        assert_eq!(rows.len(), 2);
    }
}
