//! TRE files: hierarchical lists where each leading tab nests one level.

use std::fmt;

/// Indentation of one nesting level.
pub const INDENT: char = '\t';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub value: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn add(&mut self, value: impl Into<String>) -> &mut TreeNode {
        self.children.push(TreeNode::new(value));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    fn write(&self, level: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..level {
            write!(f, "{INDENT}")?;
        }
        writeln!(f, "{}", self.value)?;
        for child in &self.children {
            child.write(level + 1, f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeFile {
    pub roots: Vec<TreeNode>,
}

impl TreeFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: impl Into<String>) -> &mut TreeNode {
        self.roots.push(TreeNode::new(value));
        let last = self.roots.len() - 1;
        &mut self.roots[last]
    }

    /// Parses tab-indented lines. A line nested more than one level below
    /// its predecessor has no parent and is dropped; empty lines are skipped.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let items: Vec<(usize, &str)> = lines
            .iter()
            .map(|line| line.as_ref())
            .filter(|line| !line.is_empty())
            .map(|line| {
                let value = line.trim_start_matches(INDENT);
                (line.len() - value.len(), value)
            })
            .collect();
        Self {
            roots: arrange(&items, 0),
        }
    }

    /// Depth-first walk over every node.
    pub fn walk(&self) -> Vec<&TreeNode> {
        fn visit<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
            for node in nodes {
                out.push(node);
                visit(&node.children, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.roots, &mut out);
        out
    }
}

fn arrange(items: &[(usize, &str)], level: usize) -> Vec<TreeNode> {
    let mut nodes = Vec::new();
    let mut index = 0;
    while index < items.len() {
        let (item_level, value) = items[index];
        index += 1;
        if item_level != level {
            continue;
        }
        let start = index;
        while index < items.len() && items[index].0 > level {
            index += 1;
        }
        nodes.push(TreeNode {
            value: value.to_string(),
            children: arrange(&items[start..index], level + 1),
        });
    }
    nodes
}

impl fmt::Display for TreeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            root.write(0, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nesting() {
        let tree = TreeFile::parse(&[
            "Science",
            "\tMathematics",
            "\t\tAlgebra",
            "\tPhysics",
            "",
            "Arts",
        ]);
        assert_eq!(tree.roots.len(), 2);
        let science = &tree.roots[0];
        assert_eq!(science.children.len(), 2);
        assert_eq!(science.children[0].children[0].value, "Algebra");
        assert_eq!(science.children[1].value, "Physics");
        assert!(tree.roots[1].children.is_empty());
    }

    #[test]
    fn test_orphans_dropped() {
        let tree = TreeFile::parse(&["\tOrphan", "Root", "\t\tTooDeep", "\tChild"]);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].children.len(), 1);
        assert_eq!(tree.roots[0].children[0].value, "Child");
    }

    #[test]
    fn test_display_round_trip() {
        let mut tree = TreeFile::new();
        tree.add("Root").add("Child").add("Grandchild");
        tree.add("Other");
        let text = tree.to_string();
        assert_eq!(text, "Root\n\tChild\n\t\tGrandchild\nOther\n");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(TreeFile::parse(&lines), tree);
        assert_eq!(tree.walk().len(), 4);
    }
}
