// SPDX-License-Identifier: Apache-2.0

//! Topological ordering of groups over their `extends` edges.

use std::collections::VecDeque;

use crate::Error;

/// Orders group indexes so that every parent precedes its children.
///
/// `nodes` holds, for each group, the index of its `extends` parent when the
/// parent exists in the registry. The returned order is deterministic: roots
/// are visited in declaration order, and children in declaration order below
/// them.
///
/// # Errors
///
/// Returns [`Error::ExtendsCycle`] naming every group of the first detected
/// cycle.
pub(crate) fn topo_order(ids: &[&str], parents: &[Option<usize>]) -> Result<Vec<usize>, Error> {
    let n = ids.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0_usize; n];
    for (child, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            children[*parent].push(child);
            indegree[child] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|i| indegree[*i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &child in &children[node] {
            indegree[child] -= 1;
            if indegree[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    // Every unordered node sits on (or below) a cycle; walk the extends
    // chain from the first one until a node repeats and report that loop.
    let start = (0..n)
        .find(|i| indegree[*i] > 0)
        .expect("an unordered node must exist");
    let mut seen = vec![false; n];
    let mut path: Vec<usize> = Vec::new();
    let mut current = start;
    loop {
        if seen[current] {
            let cycle_start = path
                .iter()
                .position(|&i| i == current)
                .unwrap_or_default();
            let cycle = path[cycle_start..]
                .iter()
                .map(|&i| ids[i].to_string())
                .collect();
            return Err(Error::ExtendsCycle { cycle });
        }
        seen[current] = true;
        path.push(current);
        current = parents[current].expect("a node on a cycle always has a parent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_come_first() {
        // c extends b, b extends a; declared in reverse order.
        let ids = ["c", "b", "a"];
        let parents = [Some(1), Some(2), None];
        let order = topo_order(&ids, &parents).unwrap();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_long_chain() {
        // A chain of 16 groups, each extending the next.
        let ids: Vec<String> = (0..16).map(|i| format!("g{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let parents: Vec<Option<usize>> =
            (0..16).map(|i| if i == 15 { None } else { Some(i + 1) }).collect();
        let order = topo_order(&id_refs, &parents).unwrap();
        assert_eq!(order.len(), 16);
        assert_eq!(order[0], 15);
        assert_eq!(order[15], 0);
    }

    #[test]
    fn test_two_cycle() {
        let ids = ["a", "b"];
        let parents = [Some(1), Some(0)];
        let err = topo_order(&ids, &parents).unwrap_err();
        match err {
            Error::ExtendsCycle { cycle } => {
                assert_eq!(cycle.len(), 2);
                assert!(cycle.contains(&"a".to_owned()));
                assert!(cycle.contains(&"b".to_owned()));
            }
            other => panic!("expected ExtendsCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle() {
        let ids = ["a"];
        let parents = [Some(0)];
        let err = topo_order(&ids, &parents).unwrap_err();
        assert!(matches!(err, Error::ExtendsCycle { cycle } if cycle == vec!["a".to_owned()]));
    }
}
