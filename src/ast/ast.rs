use crate::lexer::tokens::Operator;

/// Node Tags
///
/// The tag of every element of the tree, as the code generator sees it.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum NodeTag {
    Number,
    Variable,
    Operator,
    Keyword,
    Assignment,
    Statement,
    ScopeOpen,
    ScopeClose,
}

/// A command or expression node.
///
/// Every child is exclusively owned, so a parsed program is a strict tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Variable(String),
    Operator {
        op: Operator,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// A bare `if`/`while` head, completed by the conditional rule.
    Keyword(String),
    /// A keyword applied to a parenthesized expression, e.g. `sqrt(x)`.
    Call {
        keyword: String,
        arg: Box<Node>,
    },
    /// `if`/`while` with its condition and body.
    Conditional {
        keyword: String,
        cond: Box<Node>,
        body: Box<Link>,
    },
    Assignment {
        target: String,
        value: Box<Node>,
    },
}

impl Node {
    pub fn number(value: f64) -> Self {
        Node::Number(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::Variable(name.into())
    }

    pub fn operator(op: Operator, lhs: Node, rhs: Node) -> Self {
        Node::Operator {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        Node::Keyword(keyword.into())
    }

    pub fn call(keyword: impl Into<String>, arg: Node) -> Self {
        Node::Call {
            keyword: keyword.into(),
            arg: Box::new(arg),
        }
    }

    pub fn conditional(keyword: impl Into<String>, cond: Node, body: Link) -> Self {
        Node::Conditional {
            keyword: keyword.into(),
            cond: Box::new(cond),
            body: Box::new(body),
        }
    }

    pub fn assignment(target: impl Into<String>, value: Node) -> Self {
        Node::Assignment {
            target: target.into(),
            value: Box::new(value),
        }
    }

    pub fn tag(&self) -> NodeTag {
        match self {
            Node::Number(_) => NodeTag::Number,
            Node::Variable(_) => NodeTag::Variable,
            Node::Operator { .. } => NodeTag::Operator,
            Node::Keyword(_) | Node::Call { .. } | Node::Conditional { .. } => NodeTag::Keyword,
            Node::Assignment { .. } => NodeTag::Assignment,
        }
    }

    /// Moves every child that has children of its own onto `stack`, leaving
    /// a leaf in its place.
    fn take_children(&mut self, stack: &mut Vec<Node>) {
        let children: [Option<&mut Box<Node>>; 2] = match self {
            Node::Operator { lhs, rhs, .. } => [Some(lhs), Some(rhs)],
            Node::Call { arg, .. } => [Some(arg), None],
            Node::Conditional { cond, .. } => [Some(cond), None],
            Node::Assignment { value, .. } => [Some(value), None],
            Node::Number(_) | Node::Variable(_) | Node::Keyword(_) => [None, None],
        };

        for child in children.into_iter().flatten() {
            if !child.is_leaf() {
                stack.push(std::mem::replace(&mut **child, Node::Number(0.0)));
            }
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self, Node::Number(_) | Node::Variable(_) | Node::Keyword(_))
    }
}

// Operator chains fold left without a depth limit (`1 + 1 + ... + 1`), so
// expression trees are torn down with an explicit stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);

        while let Some(mut node) = stack.pop() {
            node.take_children(&mut stack);
        }
    }
}

/// Marker carried by a chain element.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Marker {
    /// A plain statement in a sequence.
    Statement,
    /// First element of a lexical scope.
    ScopeOpen,
    /// One lexical scope closed before this point.
    ScopeClose,
}

/// Chain Link
///
/// Statement sequences are right-linked lists of links. `command` is the
/// wrapped command (the left slot), `next` continues the enclosing chain (the
/// right slot). A run of `ScopeClose` links with no command records scopes
/// that ended; the last link of such a run usually holds the command that
/// follows them.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub marker: Marker,
    pub command: Option<Box<Node>>,
    pub next: Option<Box<Link>>,
}

impl Link {
    pub fn new(marker: Marker, command: Option<Node>, next: Option<Link>) -> Self {
        Link {
            marker,
            command: command.map(Box::new),
            next: next.map(Box::new),
        }
    }

    pub fn statement(command: Node, next: Option<Link>) -> Self {
        Link::new(Marker::Statement, Some(command), next)
    }

    pub fn scope_open(command: Option<Node>, next: Option<Link>) -> Self {
        Link::new(Marker::ScopeOpen, command, next)
    }

    pub fn scope_close(command: Option<Node>, next: Option<Link>) -> Self {
        Link::new(Marker::ScopeClose, command, next)
    }

    /// Materializes `owed` units of scope-close debt in front of `command`.
    ///
    /// With nothing owed this is a plain statement. Otherwise it is a run of
    /// `owed` scope-close links chained by `next`, the last one holding
    /// `command`.
    pub fn settle(owed: usize, command: Node) -> Self {
        if owed == 0 {
            return Link::statement(command, None);
        }

        let mut head = Link::scope_close(Some(command), None);
        for _ in 1..owed {
            head = Link::scope_close(None, Some(head));
        }
        head
    }

    /// Prefixes `count` empty scope-close links above `self`.
    pub fn wrap_in_closes(self, count: usize) -> Self {
        let mut root = self;
        for _ in 0..count {
            root = Link::scope_close(None, Some(root));
        }
        root
    }

    pub fn tag(&self) -> NodeTag {
        match self.marker {
            Marker::Statement => NodeTag::Statement,
            Marker::ScopeOpen => NodeTag::ScopeOpen,
            Marker::ScopeClose => NodeTag::ScopeClose,
        }
    }

    /// Attaches `rest` as the `next` of the last link in this chain.
    ///
    /// This walks the whole chain; builders appending repeatedly keep the
    /// slot from [`Link::tail_mut`] and use [`Link::attach`] instead.
    pub fn append(&mut self, rest: Link) {
        Link::attach(self.tail_mut(), rest);
    }

    /// The empty `next` slot of the last link in this chain.
    pub fn tail_mut(&mut self) -> &mut Option<Box<Link>> {
        let mut slot = &mut self.next;
        while let Some(link) = slot {
            slot = &mut link.next;
        }
        slot
    }

    /// Stores `rest` in `slot` and returns the empty slot at the end of
    /// `rest`, ready for the next attach.
    pub fn attach(slot: &mut Option<Box<Link>>, rest: Link) -> &mut Option<Box<Link>> {
        slot.insert(Box::new(rest)).tail_mut()
    }

    /// Walks the chain through `next`, starting with `self`.
    pub fn iter(&self) -> LinkIter<'_> {
        LinkIter { current: Some(self) }
    }

    /// The commands of the chain in order, skipping links without one.
    pub fn commands(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter_map(|link| link.command.as_deref())
    }
}

pub struct LinkIter<'a> {
    current: Option<&'a Link>,
}

impl<'a> Iterator for LinkIter<'a> {
    type Item = &'a Link;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.current?;
        self.current = link.next.as_deref();
        Some(link)
    }
}

// Chains can be long; dropping them recursively through `next` would
// overflow the stack.
impl Drop for Link {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut link) = next {
            next = link.next.take();
        }
    }
}
