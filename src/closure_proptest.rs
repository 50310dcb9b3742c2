//! Property-based tests for closure resolution and the request grammar.
//!
//! Random dependency graphs (cycles and self-dependencies included) are
//! materialized by a mock git client that writes each repository's
//! `.dependencies` file when it is cloned.

#[cfg(test)]
mod proptest_tests {
    use std::collections::{BTreeSet, HashMap};
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;
    use tempfile::TempDir;

    use crate::defaults::{CLI_REQUEST_DELIMITER, DEPENDENCIES_FILENAME};
    use crate::error::Result;
    use crate::phases::resolve::resolve_closure;
    use crate::repository::{validate_repo_name, GitOperations, RepositoryManager};
    use crate::request::{parse_requests, repo_name_from_url, CloneRequest, RequestOrigin, VersionPolicy};

    fn url(node: usize) -> String {
        format!("https://host/org/R{}", node)
    }

    struct GraphGit {
        edges: HashMap<String, Vec<String>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl GitOperations for GraphGit {
        fn clone_repository(
            &self,
            request: &CloneRequest,
            target_dir: &Path,
            _depth: u32,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(request.url.clone());
            fs::create_dir_all(target_dir)?;
            if let Some(deps) = self.edges.get(&request.url) {
                fs::write(target_dir.join(DEPENDENCIES_FILENAME), deps.join("\n"))?;
            }
            Ok(())
        }
    }

    fn reachable(edges: &[Vec<usize>], roots: &[usize]) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = roots.to_vec();
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(edges[node].iter().copied());
            }
        }
        seen
    }

    fn graph() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
        (1usize..8).prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(0..n, 0..4), n),
                prop::collection::vec(0..n, 1..4),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: resolution terminates with every reachable URL recorded
        /// exactly once, attempted, and cloned exactly once
        #[test]
        fn closure_records_each_reachable_url_once((edges, roots) in graph()) {
            let temp_dir = TempDir::new().unwrap();
            let calls = Arc::new(Mutex::new(Vec::new()));
            let git = GraphGit {
                edges: edges
                    .iter()
                    .enumerate()
                    .map(|(node, deps)| (url(node), deps.iter().map(|d| url(*d)).collect()))
                    .collect(),
                calls: calls.clone(),
            };
            let manager = RepositoryManager::with_operations(
                Box::new(git),
                temp_dir.path().join("source"),
                false,
                1,
            );

            let requests = roots.iter().map(|r| CloneRequest::new(url(*r))).collect();
            let (_, records) = resolve_closure(&manager, VersionPolicy::default(), requests);

            let expected: BTreeSet<String> = reachable(&edges, &roots).into_iter().map(url).collect();
            let recorded: Vec<String> = records.iter().map(|r| r.url().to_string()).collect();
            let unique: BTreeSet<String> = recorded.iter().cloned().collect();

            prop_assert_eq!(recorded.len(), unique.len());
            prop_assert_eq!(&unique, &expected);
            prop_assert!(records.iter().all(|r| r.attempted() && r.succeeded()));
            prop_assert_eq!(calls.lock().unwrap().len(), expected.len());
        }

        /// Property: parsing arbitrary input never panics and never yields a blank URL
        #[test]
        fn parse_requests_never_panics(input in ".*") {
            let requests = parse_requests(
                &input,
                CLI_REQUEST_DELIMITER,
                VersionPolicy::AlwaysPinned,
                RequestOrigin::Root,
            );
            for request in requests {
                prop_assert!(!request.url.trim().is_empty());
            }
        }

        /// Property: a repository name never contains a path separator
        #[test]
        fn repo_name_has_no_separator(input in ".*") {
            let name = repo_name_from_url(&input);
            prop_assert!(!name.contains('/'));
        }

        /// Property: an accepted repository name always maps to a folder
        /// strictly inside `source`, never to `source` itself or above it
        #[test]
        fn accepted_names_stay_inside_source(segment in "[A-Za-z0-9._-]{0,12}") {
            let url = format!("https://host/org/{}", segment);
            let name = repo_name_from_url(&url);
            let source = Path::new("/ws/source");
            let manager = RepositoryManager::new(source.to_path_buf(), false, 1);
            let target = manager.target_dir(&CloneRequest::new(url.clone()));

            if validate_repo_name(&url, &name).is_ok() {
                prop_assert!(!name.is_empty());
                prop_assert_eq!(target.parent(), Some(source));
                prop_assert_ne!(target.as_path(), source);
            } else {
                prop_assert!(name.is_empty() || name == "." || name == "..");
            }
        }

        /// Property: always-newest strips every pin, whatever its origin
        #[test]
        fn always_newest_strips_pins(branch in "[a-z/]{1,12}", commit in "[0-9a-f]{1,12}", dependency in any::<bool>()) {
            let origin = if dependency { RequestOrigin::Dependency } else { RequestOrigin::Root };
            let request = CloneRequest::new(url(0)).with_branch(branch).with_commit(commit);
            prop_assert!(!VersionPolicy::AlwaysNewest.apply(request, origin).is_pinned());
        }
    }
}
