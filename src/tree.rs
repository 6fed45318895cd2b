use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone)]
struct NodeData {
  name: String,
  leaf: bool,
  parent: Option<NodeId>,
  children: VecDeque<NodeId>,
}

/// Concrete syntax tree produced by a parse. Nodes are stored in an arena
/// owned by the tree; parents refer to children and children back to their
/// parent by id.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
  nodes: Vec<NodeData>,
  root: NodeId,
}

/// Arena under construction.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
  nodes: Vec<NodeData>,
}

impl TreeBuilder {
  fn push(&mut self, name: String, leaf: bool) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(NodeData {
      name,
      leaf,
      parent: None,
      children: VecDeque::new(),
    });
    id
  }

  pub(crate) fn leaf(&mut self, literal: String) -> NodeId {
    self.push(literal, true)
  }

  pub(crate) fn interior(&mut self, name: String) -> NodeId {
    self.push(name, false)
  }

  /// Makes `child` the first child of `parent`.
  pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
    self.nodes[child.0 as usize].parent = Some(parent);
    self.nodes[parent.0 as usize].children.push_front(child);
  }

  pub(crate) fn finish(mut self, root: NodeId) -> SyntaxTree {
    self.nodes[root.0 as usize].parent = None;
    SyntaxTree {
      nodes: self.nodes,
      root,
    }
  }
}

impl SyntaxTree {
  pub fn root(&self) -> Node {
    self.get(self.root)
  }

  pub fn get(&self, id: NodeId) -> Node {
    Node {
      tree: self,
      id,
    }
  }

  /// Literals of the leaves, left to right.
  pub fn leaves(&self) -> Vec<&str> {
    self.root().leaves()
  }

  pub fn to_sexpr(&self) -> String {
    self.root().to_sexpr()
  }
}

impl Display for SyntaxTree {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(&self.to_sexpr())
  }
}

#[derive(Clone, Copy)]
pub struct Node<'a> {
  tree: &'a SyntaxTree,
  id: NodeId,
}

impl<'a> Node<'a> {
  fn data(&self) -> &'a NodeData {
    &self.tree.nodes[self.id.0 as usize]
  }

  pub fn id(&self) -> NodeId {
    self.id
  }

  /// The reduced nonterminal, or the literal of a leaf.
  pub fn name(&self) -> &'a str {
    &self.data().name
  }

  pub fn is_leaf(&self) -> bool {
    self.data().leaf
  }

  pub fn parent(&self) -> Option<Node<'a>> {
    self.data().parent.map(|id| self.tree.get(id))
  }

  pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
    let tree = self.tree;
    self.data().children.iter().map(move |&id| tree.get(id))
  }

  pub fn leaves(&self) -> Vec<&'a str> {
    let mut leaves = vec![];
    let mut pending = vec![*self];
    while let Some(node) = pending.pop() {
      if node.is_leaf() {
        leaves.push(node.name());
      } else {
        let start = pending.len();
        pending.extend(node.children());
        pending[start..].reverse();
      }
    }
    leaves
  }

  /// Leaves render as `"literal"`, other nodes as `(name child ...)`.
  pub fn to_sexpr(&self) -> String {
    let mut buf = String::new();
    self.write_sexpr(&mut buf);
    buf
  }

  fn write_sexpr(&self, buf: &mut String) {
    if self.is_leaf() {
      buf.push('"');
      buf.push_str(self.name());
      buf.push('"');
      return;
    }

    buf.push('(');
    buf.push_str(self.name());
    for child in self.children() {
      buf.push(' ');
      child.write_sexpr(buf);
    }
    buf.push(')');
  }
}

impl fmt::Debug for Node<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_struct("Node")
      .field("id", &self.id)
      .field("name", &self.name())
      .field("leaf", &self.is_leaf())
      .finish()
  }
}
