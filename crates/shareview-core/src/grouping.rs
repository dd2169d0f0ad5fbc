//! Grouping shared images by sharer and disambiguating colliding display names.
//!
//! Groups are keyed by `Sharer::identifier`, never by display name. Output is
//! always sorted by display name so the people list renders in a stable order
//! without a sort step of its own.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::graph::DriveItem;
use crate::mapping::{map_items, MappingIssue};
use crate::models::{PeopleGrouping, Person, SharedImage};

/// Everything the state engine needs from one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryBuild {
    /// Disambiguated groupings, sorted by display name.
    pub groupings: Vec<PeopleGrouping>,
    /// All images flattened in grouping order.
    pub images: Vec<SharedImage>,
    pub issues: Vec<MappingIssue>,
    pub excluded_non_images: usize,
}

impl GalleryBuild {
    pub fn people(&self) -> Vec<Person> {
        self.groupings.iter().map(|g| g.person.clone()).collect()
    }
}

/// Partition images into one grouping per sharer identifier.
///
/// Images keep their input order inside a group and the first image seen for
/// an identifier supplies the group's display name.
pub fn group_by_sharer(images: Vec<SharedImage>) -> Vec<PeopleGrouping> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groupings: Vec<PeopleGrouping> = Vec::new();

    for image in images {
        match index.get(&image.shared_by.identifier) {
            Some(&pos) => groupings[pos].images.push(image),
            None => {
                index.insert(image.shared_by.identifier.clone(), groupings.len());
                groupings.push(PeopleGrouping {
                    person: Person {
                        identifier: image.shared_by.identifier.clone(),
                        display_name: image.shared_by.display_name.clone(),
                        image_count: 0,
                    },
                    images: vec![image],
                });
            }
        }
    }

    for grouping in &mut groupings {
        grouping.person.image_count = grouping.images.len();
    }

    sort_groupings(&mut groupings);
    groupings
}

/// Append the identifier to every display name shared by two or more
/// distinct identifiers, e.g. `"Sam"` becomes `"Sam (s1)"` and `"Sam (s2)"`.
///
/// Repeats until no two non-empty identifiers share a name, so a suffix that
/// happens to match another sharer's name is resolved too. Running this on
/// its own output changes nothing.
pub fn disambiguate(mut groupings: Vec<PeopleGrouping>) -> Vec<PeopleGrouping> {
    // Every pass lengthens each colliding name, so this bound is never hit
    // for well-formed input.
    for _ in 0..=groupings.len() {
        let ambiguous = ambiguous_names(&groupings);
        if ambiguous.is_empty() {
            break;
        }
        debug!(ambiguous = ambiguous.len(), "Disambiguating sharer display names");

        for grouping in &mut groupings {
            if grouping.person.identifier.is_empty()
                || !ambiguous.contains(&grouping.person.display_name)
            {
                continue;
            }
            let name = format!(
                "{} ({})",
                grouping.person.display_name, grouping.person.identifier
            );
            for image in &mut grouping.images {
                image.shared_by.display_name = name.clone();
            }
            grouping.person.display_name = name;
        }
    }

    sort_groupings(&mut groupings);
    groupings
}

/// Display names held by more than one distinct identifier.
fn ambiguous_names(groupings: &[PeopleGrouping]) -> HashSet<String> {
    let mut identifiers_by_name: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for grouping in groupings {
        identifiers_by_name
            .entry(grouping.person.display_name.as_str())
            .or_default()
            .insert(grouping.person.identifier.as_str());
    }

    identifiers_by_name
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Run the full pipeline over a raw listing: filter, map, group, disambiguate.
pub fn build_gallery(items: &[DriveItem]) -> GalleryBuild {
    let mapped = map_items(items);
    let groupings = disambiguate(group_by_sharer(mapped.images));
    let images = groupings
        .iter()
        .flat_map(|g| g.images.iter().cloned())
        .collect();

    GalleryBuild {
        groupings,
        images,
        issues: mapped.issues,
        excluded_non_images: mapped.excluded_non_images,
    }
}

fn sort_groupings(groupings: &mut [PeopleGrouping]) {
    groupings.sort_by(|a, b| compare_people(&a.person, &b.person));
}

/// Case-insensitive name order; exact name then identifier break ties.
fn compare_people(a: &Person, b: &Person) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.identifier.cmp(&b.identifier))
}
