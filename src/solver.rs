// {{{ Copyright (c) Paul R. Tagliamonte <paultag@debian.org>, 2024
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE. }}}

//! The internal solver: greedy backtracking over a work queue of
//! compound dependencies, not a SAT/ILP formulation. Small destinations and
//! shallow dependency graphs don't need the generality, and a greedy walk is
//! far easier to explain when it rejects a plan.

use crate::architecture::ArchitecturePriority;
use crate::dependency::{CompoundDepend, DepKind, Possibility};
use crate::index::{PackageId, PackageIndex};
use crate::options::Options;
use crate::state::{Flag, Status};
use std::collections::HashSet;

/// What the caller wants done with one package, the seed of a solve.
#[derive(Clone, Debug, PartialEq)]
pub enum Goal {
    /// Install (or upgrade) the named package, optionally pinned to an exact
    /// version.
    Install {
        /// The possibility to satisfy -- a name and optional constraint.
        possibility: Possibility,
    },
    /// Remove the named concrete package.
    Remove {
        /// The package to remove.
        package: PackageId,
    },
}

/// One step of a resolved plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Download, verify and unpack.
    Install,
    /// Run the maintainer scripts to bring an unpacked package to
    /// `installed`.
    Configure,
    /// Remove the package's files but keep its conffiles.
    Remove,
    /// Remove the package's files and conffiles.
    Purge,
}

/// One entry of a resolved [Plan].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Action {
    /// Which package this action applies to.
    pub package: PackageId,
    /// What to do with it.
    pub op: Op,
}

/// A linear, dependency-ordered action plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    /// Actions in the order they must be carried out: Pre-Depends installs
    /// precede their dependents.
    pub actions: Vec<Action>,
}

/// Why the solver couldn't produce a plan.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// No provider of `possibility` satisfied the architecture, version and
    /// hold constraints.
    Unsatisfiable {
        /// The possibility the solver couldn't satisfy.
        possibility: Possibility,
        /// The tentative frontier at the point of the last backtrack,
        /// surfacing the minimal blocking chain.
        blocking_chain: Vec<String>,
    },
    /// Every candidate for `possibility` conflicts with something already
    /// scheduled, and none of them can replace it.
    Conflicting {
        /// The possibility the solver couldn't satisfy without a conflict.
        possibility: Possibility,
        /// The already-scheduled package it collided with.
        with: String,
    },
    /// An essential package was asked to be removed without `force_depends`.
    EssentialRemoval {
        /// The essential package's name.
        name: String,
    },
    /// A raw dependency field failed to parse.
    Dependency(crate::dependency::Error),
    /// Expanding an abstract package's providers into the index failed.
    Index(crate::index::Error),
}
crate::errors::error_enum!(Error);

impl From<crate::dependency::Error> for Error {
    fn from(e: crate::dependency::Error) -> Self {
        Error::Dependency(e)
    }
}

impl From<crate::index::Error> for Error {
    fn from(e: crate::index::Error) -> Self {
        Error::Index(e)
    }
}

/// Tentative world state built up during one solve.
struct World {
    scheduled: Vec<Action>,
    installing: HashSet<PackageId>,
    removing: HashSet<PackageId>,
}

impl World {
    fn new() -> Self {
        World {
            scheduled: vec![],
            installing: HashSet::new(),
            removing: HashSet::new(),
        }
    }

    fn is_tentatively_present(&self, index: &PackageIndex, id: PackageId) -> bool {
        if self.removing.contains(&id) {
            return false;
        }
        if self.installing.contains(&id) {
            return true;
        }
        index.package(id).state.status == Status::Installed
            || index.package(id).state.status == Status::Unpacked
    }
}

fn candidate_rank(index: &PackageIndex, arch: &ArchitecturePriority, id: PackageId) -> (bool, bool, crate::version::Version, u32) {
    let pkg = index.package(id);
    let prefer = pkg.state.flags.contains(Flag::Prefer);
    let installed = matches!(pkg.state.status, Status::Installed | Status::Unpacked);
    (prefer, installed, pkg.version.clone(), arch.priority(&pkg.architecture))
}

/// Find the best candidate for `possibility` among its abstract name's
/// providers, applying the architecture, version, hold and preference
/// filters in turn.
fn best_candidate(
    index: &mut PackageIndex,
    arch: &ArchitecturePriority,
    world: &World,
    possibility: &Possibility,
) -> Result<Option<PackageId>, Error> {
    index.ensure_dependencies_checked(&possibility.name)?;
    let Some(abstract_id) = index.find_abstract(&possibility.name) else {
        return Ok(None);
    };

    let mut candidates: Vec<PackageId> = index
        .abstract_package(abstract_id)
        .providers
        .iter()
        .copied()
        .filter(|&id| {
            let pkg = index.package(id);
            arch.priority(&pkg.architecture) > 0 && possibility.constraint.satisfied_by(&pkg.version)
        })
        .filter(|&id| {
            let pkg = index.package(id);
            !pkg.state.flags.contains(Flag::Hold) || world.is_tentatively_present(index, id)
        })
        .collect();

    candidates.sort_by(|&a, &b| candidate_rank(index, arch, b).cmp(&candidate_rank(index, arch, a)));
    Ok(candidates.into_iter().next())
}

fn conflicting_installed(
    index: &mut PackageIndex,
    world: &World,
    candidate: PackageId,
) -> Result<Vec<PackageId>, Error> {
    let pkg = index.package(candidate).clone();
    let compounds = CompoundDepend::parse_field(DepKind::Conflict, &pkg.conflicts)?;
    let mut hits = vec![];
    for compound in compounds {
        for possibility in &compound.possibilities {
            index.ensure_dependencies_checked(&possibility.name)?;
            let Some(abstract_id) = index.find_abstract(&possibility.name) else {
                continue;
            };
            for &provider in &index.abstract_package(abstract_id).providers.clone() {
                if provider == candidate {
                    continue;
                }
                if world.is_tentatively_present(index, provider)
                    && possibility.constraint.satisfied_by(&index.package(provider).version)
                {
                    hits.push(provider);
                }
            }
        }
    }
    Ok(hits)
}

fn replaces_covers(index: &mut PackageIndex, candidate: PackageId, target: PackageId) -> Result<bool, Error> {
    let pkg = index.package(candidate).clone();
    let target_name = index.package(target).name.clone();
    let compounds = CompoundDepend::parse_field(DepKind::Replace, &pkg.replaces)?;
    Ok(compounds.iter().any(|c| {
        c.possibilities.iter().any(|p| {
            p.name == target_name && p.constraint.satisfied_by(&index.package(target).version)
        })
    }))
}

/// A pending compound to satisfy, with enough context to surface a blocking
/// chain if it can't be.
struct WorkItem {
    compound: CompoundDepend,
}

/// Resolve `goals` against `index` into a [Plan]. A scheduled
/// `Replaces:` takeover only decides which packages get removed here; the
/// actual file-ownership handoff happens in the transaction engine once it
/// unpacks the replacing package.
pub fn solve(
    index: &mut PackageIndex,
    arch: &ArchitecturePriority,
    options: &Options,
    goals: Vec<Goal>,
) -> Result<Plan, Error> {
    let mut world = World::new();
    let mut queue: Vec<WorkItem> = vec![];

    for goal in goals {
        match goal {
            Goal::Install { possibility } => {
                queue.push(WorkItem {
                    compound: CompoundDepend {
                        kind: DepKind::Depend,
                        possibilities: vec![possibility],
                    },
                });
            }
            Goal::Remove { package } => {
                if index.package(package).essential && !options.force_depends {
                    return Err(Error::EssentialRemoval {
                        name: index.package(package).name.clone(),
                    });
                }
                world.removing.insert(package);
                world.scheduled.push(Action {
                    package,
                    op: Op::Remove,
                });
            }
        }
    }

    while let Some(item) = queue.pop() {
        let mut satisfied = false;
        let mut last_error = None;

        for possibility in &item.compound.possibilities {
            match best_candidate(index, arch, &world, possibility) {
                Ok(Some(candidate)) => {
                    if world.installing.contains(&candidate) {
                        satisfied = true;
                        break;
                    }

                    if matches!(
                        index.package(candidate).state.status,
                        Status::Installed | Status::Unpacked
                    ) && !world.removing.contains(&candidate)
                    {
                        // Already on disk at a version satisfying this
                        // possibility and not itself being replaced: no
                        // action needed, per the `noop` plan entry.
                        satisfied = true;
                        break;
                    }

                    let conflicts = conflicting_installed(index, &world, candidate)?;
                    let mut blocked_by = None;
                    for other in conflicts {
                        if replaces_covers(index, candidate, other)? {
                            world.removing.insert(other);
                            world.scheduled.push(Action {
                                package: other,
                                op: Op::Remove,
                            });
                        } else {
                            blocked_by = Some(other);
                            break;
                        }
                    }

                    if let Some(other) = blocked_by {
                        last_error = Some(Error::Conflicting {
                            possibility: possibility.clone(),
                            with: index.package(other).name.clone(),
                        });
                        continue;
                    }

                    world.installing.insert(candidate);
                    world.scheduled.push(Action {
                        package: candidate,
                        op: Op::Install,
                    });
                    world.scheduled.push(Action {
                        package: candidate,
                        op: Op::Configure,
                    });

                    let pkg = index.package(candidate).clone();
                    for (kind, field) in [
                        (DepKind::PreDepend, &pkg.pre_depends),
                        (DepKind::Depend, &pkg.depends),
                    ] {
                        for compound in CompoundDepend::parse_field(kind, field)? {
                            queue.push(WorkItem { compound });
                        }
                    }
                    if options.add_recommends {
                        for compound in CompoundDepend::parse_field(DepKind::Recommend, &pkg.recommends)? {
                            queue.push(WorkItem { compound });
                        }
                    }

                    satisfied = true;
                    break;
                }
                Ok(None) => continue,
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        if !satisfied {
            let blocking_chain = world
                .scheduled
                .iter()
                .map(|a| index.package(a.package).name.clone())
                .collect();
            return Err(last_error.unwrap_or(Error::Unsatisfiable {
                possibility: item.compound.possibilities[0].clone(),
                blocking_chain,
            }));
        }
    }

    let mut plan = topological_sort(index, world.scheduled);
    if !options.configure_on_unpack {
        let (unpack, configure): (Vec<Action>, Vec<Action>) =
            plan.actions.into_iter().partition(|a| a.op != Op::Configure);
        plan.actions = unpack.into_iter().chain(configure).collect();
    }
    Ok(plan)
}

/// Sort a flat action list so that every Pre-Depends install precedes its
/// dependent's install/configure. A stable sort keyed on Pre-Depends depth
/// is sufficient here: the greedy solver
/// above already enqueues Pre-Depends before Depends for each candidate, so
/// this only needs to fix up cross-candidate ordering.
fn topological_sort(index: &PackageIndex, actions: Vec<Action>) -> Plan {
    let mut depth_cache = std::collections::HashMap::new();
    fn pre_depends_depth(
        index: &PackageIndex,
        id: PackageId,
        cache: &mut std::collections::HashMap<PackageId, u32>,
        visiting: &mut HashSet<PackageId>,
    ) -> u32 {
        if let Some(&d) = cache.get(&id) {
            return d;
        }
        if !visiting.insert(id) {
            return 0;
        }
        let pkg = index.package(id);
        let depth = CompoundDepend::parse_field(DepKind::PreDepend, &pkg.pre_depends)
            .unwrap_or_default()
            .iter()
            .flat_map(|c| &c.possibilities)
            .filter_map(|p| index.find_abstract(&p.name))
            .flat_map(|a| index.abstract_package(a).providers.clone())
            .map(|dep_id| pre_depends_depth(index, dep_id, cache, visiting) + 1)
            .max()
            .unwrap_or(0);
        visiting.remove(&id);
        cache.insert(id, depth);
        depth
    }

    let mut actions = actions;
    actions.sort_by_key(|a| {
        let mut visiting = HashSet::new();
        pre_depends_depth(index, a.package, &mut depth_cache, &mut visiting)
    });
    Plan { actions }
}


// vim: foldmethod=marker
