use crate::locator::{OverrideMode, locate_variant_with};
use crate::ports::VariantOutput;
use std::collections::BTreeSet;
use vcode_types::candidate::ManifestCandidate;
use vcode_types::diagnostics::Diagnostics;
use vcode_types::plan::{PlanSummary, WorkUnit};

/// Deterministic work-unit name, e.g. `overrideFreeReleaseVersionCode1`.
pub fn work_unit_name(variant_name: &str, sequence_index: u32) -> String {
    format!(
        "override{}VersionCode{}",
        upper_first(variant_name),
        sequence_index
    )
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Work units for one variant's candidates: after the producing step, before
/// every manifest consumer.
pub fn plan_work_units(
    variant: &dyn VariantOutput,
    candidates: Vec<ManifestCandidate>,
) -> Vec<WorkUnit> {
    let consumers = variant.manifest_consumers();
    candidates
        .into_iter()
        .map(|candidate| WorkUnit {
            name: work_unit_name(&candidate.variant_name, candidate.sequence_index),
            after: candidate.step.clone(),
            before: consumers.clone(),
            candidate,
        })
        .collect()
}

/// Locator and planner output for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedRun {
    pub units: Vec<WorkUnit>,
    pub overrides_applied: Vec<String>,
    pub summary: PlanSummary,
}

/// Locate every variant and turn the candidates into uniquely named work units.
pub fn plan_variants(
    variants: &[&dyn VariantOutput],
    value: u32,
    diag: &dyn Diagnostics,
) -> PlannedRun {
    plan_variants_with(variants, value, OverrideMode::Invoke, diag)
}

/// [`plan_variants`] with an explicit [`OverrideMode`] for the locator.
pub fn plan_variants_with(
    variants: &[&dyn VariantOutput],
    value: u32,
    mode: OverrideMode,
    diag: &dyn Diagnostics,
) -> PlannedRun {
    let mut run = PlannedRun::default();
    let mut names = BTreeSet::new();

    for variant in variants {
        let location = locate_variant_with(*variant, value, mode, diag);
        if location.override_applied {
            run.overrides_applied.push(variant.name().to_string());
        }

        for mut unit in plan_work_units(*variant, location.candidates) {
            if !names.insert(unit.name.clone()) {
                let base = unit.name.clone();
                let mut n = 2;
                while !names.insert(format!("{base}_{n}")) {
                    n += 1;
                }
                unit.name = format!("{base}_{n}");
                diag.warn(&format!(
                    "work unit name '{}' already taken (duplicate variant '{}'); using '{}'",
                    base,
                    variant.name(),
                    unit.name
                ));
            }
            run.units.push(unit);
        }
    }

    run.summary = PlanSummary {
        variants: variants.len() as u64,
        units: run.units.len() as u64,
        overrides_applied: run.overrides_applied.len() as u64,
    };
    run
}
