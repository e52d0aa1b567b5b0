use std::fmt;
use std::sync::Arc;

use crate::ast::Comparator;
use crate::value::Value;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Each variant carries only the fields meaningful to its kind. A tree is
/// finite, acyclic and never mutated after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// Field lookup on an object
    ///
    /// # Example
    /// ```text
    /// foo
    /// "with space"
    /// ```
    Field { name: String },

    /// Evaluates `right` against the result of `left`
    ///
    /// # Example
    /// ```text
    /// foo.bar
    /// ```
    Subexpression { left: Box<Ast>, right: Box<Ast> },

    /// Array index, negative values count from the end
    Index { index: i64 },

    /// Array slice `[start:stop:step]`
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },

    /// An `Index` or `Slice` applied to the result of `left`
    ///
    /// # Example
    /// ```text
    /// foo[0]
    /// ```
    IndexExpression { left: Box<Ast>, right: Box<Ast> },

    /// Array projection: `right` is applied to each element of `left`
    ///
    /// # Example
    /// ```text
    /// foo[*].bar
    /// ```
    Projection { left: Box<Ast>, right: Box<Ast> },

    /// Object-values projection
    ///
    /// # Example
    /// ```text
    /// foo.*.bar
    /// ```
    ValueProjection { left: Box<Ast>, right: Box<Ast> },

    /// Keeps the elements of `left` whose `condition` is true-like, then
    /// projects `right` over them
    ///
    /// # Example
    /// ```text
    /// foo[?age > `20`].name
    /// ```
    FilterProjection {
        left: Box<Ast>,
        right: Box<Ast>,
        condition: Box<Ast>,
    },

    /// Comparison between two expressions
    Comparator {
        op: Comparator,
        left: Box<Ast>,
        right: Box<Ast>,
    },

    /// One level of array flattening (`[]`)
    Flatten { node: Box<Ast> },

    /// The value being evaluated, used as an implicit operand
    Identity,

    /// `[a, b]`
    MultiSelectList { elements: Vec<Ast> },

    /// `{x: a, y: b}`
    MultiSelectHash { pairs: Vec<KeyValuePair> },

    /// `left || right`
    OrExpression { left: Box<Ast>, right: Box<Ast> },

    /// `left && right`
    AndExpression { left: Box<Ast>, right: Box<Ast> },

    /// `!node`
    NotExpression { node: Box<Ast> },

    /// Decoded literal value
    Literal { value: Value },

    /// `left | right`
    Pipe { left: Box<Ast>, right: Box<Ast> },

    /// The current node (`@`)
    Current,

    /// Builtin function call
    ///
    /// # Example
    /// ```text
    /// sort_by(people, &age)
    /// ```
    Function { name: String, args: Vec<Ast> },

    /// Captured expression (`&node`), evaluated later by a builtin
    ExpressionReference { node: Arc<Ast> },
}

/// One `key: value` entry of a [`Ast::MultiSelectHash`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: Ast,
}

impl Ast {
    /// Kind name of the node, as used by the tree rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            Ast::Field { .. } => "Field",
            Ast::Subexpression { .. } => "Subexpression",
            Ast::Index { .. } => "Index",
            Ast::Slice { .. } => "Slice",
            Ast::IndexExpression { .. } => "IndexExpression",
            Ast::Projection { .. } => "Projection",
            Ast::ValueProjection { .. } => "ValueProjection",
            Ast::FilterProjection { .. } => "FilterProjection",
            Ast::Comparator { .. } => "Comparator",
            Ast::Flatten { .. } => "Flatten",
            Ast::Identity => "Identity",
            Ast::MultiSelectList { .. } => "MultiSelectList",
            Ast::MultiSelectHash { .. } => "MultiSelectHash",
            Ast::OrExpression { .. } => "OrExpression",
            Ast::AndExpression { .. } => "AndExpression",
            Ast::NotExpression { .. } => "NotExpression",
            Ast::Literal { .. } => "Literal",
            Ast::Pipe { .. } => "Pipe",
            Ast::Current => "Current",
            Ast::Function { .. } => "Function",
            Ast::ExpressionReference { .. } => "ExpressionReference",
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Ast::Field { name } => writeln!(f, "{pad}Field {name:?}"),
            Ast::Index { index } => writeln!(f, "{pad}Index {index}"),
            Ast::Slice { start, stop, step } => {
                let part = |p: &Option<i64>| p.map(|n| n.to_string()).unwrap_or_default();
                writeln!(f, "{pad}Slice [{}:{}:{}]", part(start), part(stop), part(step))
            }
            Ast::Literal { value } => writeln!(f, "{pad}Literal {value}"),
            Ast::Identity | Ast::Current => writeln!(f, "{pad}{}", self.kind()),
            Ast::Comparator { op, left, right } => {
                writeln!(f, "{pad}Comparator {op}")?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)
            }
            Ast::Subexpression { left, right }
            | Ast::IndexExpression { left, right }
            | Ast::Projection { left, right }
            | Ast::ValueProjection { left, right }
            | Ast::OrExpression { left, right }
            | Ast::AndExpression { left, right }
            | Ast::Pipe { left, right } => {
                writeln!(f, "{pad}{}", self.kind())?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)
            }
            Ast::FilterProjection {
                left,
                right,
                condition,
            } => {
                writeln!(f, "{pad}FilterProjection")?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)?;
                condition.write_tree(f, depth + 1)
            }
            Ast::Flatten { node } | Ast::NotExpression { node } => {
                writeln!(f, "{pad}{}", self.kind())?;
                node.write_tree(f, depth + 1)
            }
            Ast::ExpressionReference { node } => {
                writeln!(f, "{pad}ExpressionReference")?;
                node.write_tree(f, depth + 1)
            }
            Ast::MultiSelectList { elements } => {
                writeln!(f, "{pad}MultiSelectList")?;
                elements.iter().try_for_each(|e| e.write_tree(f, depth + 1))
            }
            Ast::MultiSelectHash { pairs } => {
                writeln!(f, "{pad}MultiSelectHash")?;
                for pair in pairs {
                    writeln!(f, "{pad}  KeyValuePair {:?}", pair.key)?;
                    pair.value.write_tree(f, depth + 2)?;
                }
                Ok(())
            }
            Ast::Function { name, args } => {
                writeln!(f, "{pad}Function {name}")?;
                args.iter().try_for_each(|a| a.write_tree(f, depth + 1))
            }
        }
    }
}

impl fmt::Display for Ast {
    /// Renders the tree one node per line, children indented by two spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
