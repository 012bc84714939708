//! Recalculation ordering.
//!
//! Given a changed cell, find every cell reachable through dependent edges
//! and order them so each cell comes after everything it depends on. The
//! traversal takes the dependents relation as a function so callers can
//! overlay edges that have not been committed to the graph yet.

use std::collections::HashMap;

/// A cycle was reached while ordering; `cell` is where it closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetected {
    pub cell: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame {
    cell: String,
    children: Vec<String>,
    next: usize,
}

impl Frame {
    fn new(cell: String, mut children: Vec<String>) -> Self {
        // Lexicographic visiting keeps the order deterministic
        children.sort();
        Self {
            cell,
            children,
            next: 0,
        }
    }
}

/// Order `start` and everything that transitively depends on it.
///
/// The result is reverse depth-first postorder: `start` is always first and
/// for every edge between two returned cells the dependee precedes the
/// dependent. Reaching a cell that is still in progress means a cycle.
pub fn recalc_order<F>(start: &str, dependents_of: F) -> Result<Vec<String>, CycleDetected>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut postorder = Vec::new();

    marks.insert(start.to_string(), Mark::InProgress);
    let mut stack = vec![Frame::new(start.to_string(), dependents_of(start))];

    while let Some(frame) = stack.last_mut() {
        if frame.next < frame.children.len() {
            let child = frame.children[frame.next].clone();
            frame.next += 1;

            match marks.get(&child) {
                Some(Mark::InProgress) => return Err(CycleDetected { cell: child }),
                Some(Mark::Done) => {}
                None => {
                    marks.insert(child.clone(), Mark::InProgress);
                    let children = dependents_of(&child);
                    stack.push(Frame::new(child, children));
                }
            }
        } else if let Some(done) = stack.pop() {
            marks.insert(done.cell.clone(), Mark::Done);
            postorder.push(done.cell);
        }
    }

    postorder.reverse();
    Ok(postorder)
}
