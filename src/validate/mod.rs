//! Checking a container's structure against a schema.

mod report;

pub use report::{Issue, IssueKind, ValidationReport};

use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, trace};
use rayon::prelude::*;
use vec1::Vec1;

use crate::{
    container::{ContainerRead, Entry},
    schema::{Hdf5Type, NodeDescriptor, NodePath, SchemaDocument},
};

/// Check `container` against every node of `doc`. Problems with the container
/// are never errors; they are all collected into the returned report.
///
/// Every node is checked in declaration order; a missing or malformed node
/// doesn't stop anything else from being checked. After that, the extents of
/// every named dimension are compared across all datasets that use it.
pub fn validate_container<C: ContainerRead + ?Sized>(
    doc: &SchemaDocument,
    container: &C,
) -> ValidationReport {
    let mut issues = vec![];
    let mut extents = DimensionIndex::default();

    for (path, descriptor) in doc.iter() {
        let entry = container.entry(path);
        trace!("Checking {path}: {entry:?}");
        let entry = match entry {
            Some(e) => e,
            None => {
                issues.push(Issue::new(path.clone(), IssueKind::MissingPath));
                continue;
            }
        };

        match (descriptor, entry) {
            (NodeDescriptor::Root(_) | NodeDescriptor::Group(_), Entry::Group) => (),

            (NodeDescriptor::Root(_) | NodeDescriptor::Group(_), Entry::Dataset(_)) => {
                issues.push(Issue::new(
                    path.clone(),
                    IssueKind::WrongHdf5Type {
                        expected: descriptor.hdf5_type(),
                        found: Hdf5Type::Dataset,
                    },
                ))
            }

            (NodeDescriptor::Dataset(_), Entry::Group) => issues.push(Issue::new(
                path.clone(),
                IssueKind::WrongHdf5Type {
                    expected: Hdf5Type::Dataset,
                    found: Hdf5Type::Group,
                },
            )),

            (NodeDescriptor::Dataset(d), Entry::Dataset(info)) => {
                if info.rank() != d.dims.len() {
                    issues.push(Issue::new(
                        path.clone(),
                        IssueKind::RankMismatch {
                            expected: d.dims.len(),
                            found: info.rank(),
                        },
                    ));
                    continue;
                }
                for (dim, &extent) in d.dims.iter().zip(info.shape.iter()) {
                    extents.observe(dim, path, extent);
                }
            }
        }
    }

    let (mismatches, agreed) = extents.check();
    issues.extend(mismatches);

    let report = ValidationReport::new(doc.class_name().map(|s| s.to_string()), issues, agreed);
    debug!(
        "Validated against {}: {} issue(s)",
        doc.class_name().unwrap_or("<unnamed>"),
        report.len()
    );
    report
}

/// Validate several containers against the same schema in parallel. The
/// reports are in the same order as `containers`.
pub fn validate_many<C: ContainerRead>(
    doc: &SchemaDocument,
    containers: &[C],
) -> Vec<ValidationReport> {
    containers
        .par_iter()
        .map(|c| validate_container(doc, c))
        .collect()
}

/// Every (dataset, extent) seen for each dimension name, in order of first
/// appearance.
#[derive(Default)]
struct DimensionIndex {
    order: Vec<(String, Vec1<(NodePath, usize)>)>,
    lookup: HashMap<String, usize>,
}

impl DimensionIndex {
    fn observe(&mut self, dim: &str, path: &NodePath, extent: usize) {
        match self.lookup.get(dim) {
            Some(&i) => self.order[i].1.push((path.clone(), extent)),
            None => {
                self.lookup.insert(dim.to_string(), self.order.len());
                self.order
                    .push((dim.to_string(), Vec1::new((path.clone(), extent))));
            }
        }
    }

    /// Split the dimensions into mismatches (one issue per dimension) and the
    /// extents of the dimensions that agree.
    fn check(self) -> (Vec<Issue>, Vec<(String, usize)>) {
        let mut issues = vec![];
        let mut agreed = vec![];
        for (dim, observed) in self.order {
            let first_extent = observed.first().1;
            if observed.iter().all(|(_, e)| *e == first_extent) {
                agreed.push((dim, first_extent));
                continue;
            }

            // A dataset using the same name on two axes appears once per
            // distinct extent.
            let first_path = observed.first().0.clone();
            let observed = observed.into_iter().unique().collect::<Vec<_>>();
            let observed = match Vec1::try_from_vec(observed) {
                Ok(v) => v,
                Err(_) => continue,
            };
            issues.push(Issue::new(
                first_path,
                IssueKind::DimensionExtentMismatch {
                    dimension: dim,
                    observed,
                },
            ));
        }
        (issues, agreed)
    }
}
