//! Group operations: fusing placement units into composites.
//!
//! Fusing removes the selected units from the roster (preserving the order
//! of the survivors), appends one composite at the end, and rewrites every
//! force/reject triple through the induced index remap. All renumbering
//! lives in [`fuse_units`] so it can be audited and property-tested in one
//! place.

use std::collections::BTreeSet;

use log::debug;

use crate::error::ScheduleError;
use crate::problem::{ProblemInfo, Triple, Unit, UnitId};

/// Applies the input's group operations in caller order. Each entry is a
/// list of person keys to fuse.
pub fn apply_groups(
    info: ProblemInfo,
    groups: &[Vec<String>],
) -> Result<ProblemInfo, ScheduleError> {
    groups.iter().try_fold(info, |info, keys| {
        let members: Vec<UnitId> = keys.iter().cloned().map(UnitId::Person).collect();
        fuse_units(info, &members)
    })
}

/// Fuses the given units into one composite placement unit.
///
/// The composite inherits the sums of its constituents' headcount, female
/// and experienced counts, the `", "`-joined names, and the flattened list
/// of person keys as its identifier. It is appended after the surviving
/// units, so its index is `U - |members|` in the new roster.
///
/// Because identifiers flatten, fusing a set whose only member is an
/// existing composite reproduces the instance unchanged.
pub fn fuse_units(info: ProblemInfo, members: &[UnitId]) -> Result<ProblemInfo, ScheduleError> {
    if members.is_empty() {
        return Ok(info);
    }

    let mut fused: Vec<usize> = Vec::with_capacity(members.len());
    for member in members {
        let index = info
            .units()
            .iter()
            .position(|unit| &unit.id == member)
            .ok_or_else(|| ScheduleError::UnknownUnit(member.to_string()))?;
        if fused.contains(&index) {
            return Err(ScheduleError::InconsistentInputs(format!(
                "unit {member} listed twice in one group operation"
            )));
        }
        fused.push(index);
    }
    let fused_set: BTreeSet<usize> = fused.iter().copied().collect();

    // Survivors keep their relative order; `remap[old]` is the new index.
    let num_units = info.num_units();
    let mut remap: Vec<Option<usize>> = vec![None; num_units];
    let mut next = 0;
    for (old, slot) in remap.iter_mut().enumerate() {
        if !fused_set.contains(&old) {
            *slot = Some(next);
            next += 1;
        }
    }
    let composite_index = next;

    // The composite is built in member order, matching how couples are
    // listed in the configuration.
    let mut keys: Vec<String> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut headcount = 0;
    let mut female = 0;
    let mut experienced = 0;
    for &index in &fused {
        let unit = &info.units()[index];
        keys.extend(unit.id.keys().iter().cloned());
        names.push(unit.name.clone());
        headcount += unit.headcount;
        female += unit.female;
        experienced += unit.experienced;
    }
    let composite = Unit {
        id: UnitId::Group(keys),
        name: names.join(", "),
        headcount,
        female,
        experienced,
    };
    debug!(
        "fusing {} unit(s) into composite {} at index {}",
        fused.len(),
        composite.id,
        composite_index
    );

    let mut units: Vec<Unit> = info
        .units()
        .iter()
        .enumerate()
        .filter(|(old, _)| !fused_set.contains(old))
        .map(|(_, unit)| unit.clone())
        .collect();
    units.push(composite);

    let map_triple = |&(unit, day, task): &Triple| -> Triple {
        if fused_set.contains(&unit) {
            (composite_index, day, task)
        } else {
            (remap[unit].expect("survivor has a remapped index"), day, task)
        }
    };
    let force: Vec<Triple> = info.force().iter().map(map_triple).collect();
    let reject: Vec<Triple> = info.reject().iter().map(map_triple).collect();

    // The builder re-deduplicates and re-applies reject-wins, which matters
    // here: remapping can collapse distinct triples onto the composite.
    ProblemInfo::builder(info.tasks().to_vec(), info.days().to_vec())
        .units(units)
        .demand(info.demand().clone())
        .force(force)
        .reject(reject)
        .build()
}
