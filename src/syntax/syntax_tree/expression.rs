//! Syntax tree nodes for expressions, and their parsing functions.
//!
//! Expressions are stratified into ordered precedence levels. Every level
//! produces a flat chain (a first term plus a list of `(operator, term)`
//! pairs) instead of a binary tree, preserving left-to-right evaluation
//! order for same-precedence runs and letting a relation chain like
//! `a < b < c` be evaluated as a logical AND of consecutive comparisons.

use derive_more::From;
use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};

use crate::{
    base::{
        source_file::{Location, SourceElement},
        SyntaxError,
    },
    lexical::token::{OperatorKind, TokenKind},
    syntax::parser::Parser,
};

use super::{declaration::Define, indent, Render};

/// Syntax Synopsis:
///
/// ``` ebnf
/// Name:
///     Identifier
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Name {
    location: Location,
    /// The identifier spelling.
    #[get = "pub"]
    name: String,
}

impl SourceElement for Name {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Name {
    fn render(&self, depth: usize) -> String {
        format!("{}Name {}\n", indent(depth), self.name)
    }
}

/// The payload of a literal constant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum ConstantValue {
    Float(f64),
    Integer(i64),
    String(String),
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Constant:
///     Float
///     | Integer
///     | String
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Constant {
    location: Location,
    /// The value of the constant.
    #[get = "pub"]
    value: ConstantValue,
}

impl SourceElement for Constant {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Constant {
    fn render(&self, depth: usize) -> String {
        match &self.value {
            ConstantValue::Float(value) => format!("{}Float {value:?}\n", indent(depth)),
            ConstantValue::Integer(value) => format!("{}Integer {value}\n", indent(depth)),
            ConstantValue::String(value) => {
                format!("{}String \"{}\"\n", indent(depth), crate::util::escape_str(value))
            }
        }
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Pair:
///     Name '->' Expression
///     ;
/// ```
///
/// The pointer-pair shorthand. Depending on context it is later
/// reinterpreted as either a map entry (`{ a -> 1 }`) or left as a generic
/// component.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Pair {
    location: Location,
    /// The name on the left of the pointer operator.
    #[get = "pub"]
    name: Name,
    /// The value expression on the right of the pointer operator.
    #[get = "pub"]
    value: Box<Expression>,
}

impl SourceElement for Pair {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Pair {
    fn render(&self, depth: usize) -> String {
        format!(
            "{}Pair\n{}{}",
            indent(depth),
            self.name.render(depth + 1),
            self.value.render(depth + 1)
        )
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Map:
///     '{' ((Expression ':' Expression | Name '->' Expression) ',')* '}'
///     ;
/// ```
///
/// A pointer-pair entry is stored with its key synthesized as a string
/// constant, so `{ a -> 1 }` and `{ "a": 1 }` produce the same tree.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Map {
    location: Location,
    /// The key/value entries of the map, in source order.
    #[get = "pub"]
    items: Vec<(Expression, Expression)>,
}

impl SourceElement for Map {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Map {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Map\n", indent(depth));
        for (key, value) in &self.items {
            result += &format!("{}Key\n", indent(depth + 1));
            result += &key.render(depth + 2);
            result += &format!("{}Value\n", indent(depth + 1));
            result += &value.render(depth + 2);
        }
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// List:
///     '[' (Expression ',')* ']'
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct List {
    location: Location,
    /// The elements of the list, in source order.
    #[get = "pub"]
    items: Vec<Expression>,
}

impl SourceElement for List {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for List {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}List\n", indent(depth));
        for item in &self.items {
            result += &item.render(depth + 1);
        }
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Tuple:
///     '(' (Expression ',')* ')'
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Tuple {
    location: Location,
    /// The elements of the tuple, in source order.
    #[get = "pub"]
    items: Vec<Expression>,
}

impl Tuple {
    pub(crate) fn new(location: Location, items: Vec<Expression>) -> Self {
        Self { location, items }
    }
}

impl SourceElement for Tuple {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Tuple {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Tuple\n", indent(depth));
        for item in &self.items {
            result += &item.render(depth + 1);
        }
        result
    }
}

/// The variants of a [`Unit`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum UnitKind {
    /// A unary-prefixed unit, e.g. `-x` on the right of `**`.
    Unary {
        /// The prefix operator.
        op: OperatorKind,
        /// The prefixed unit.
        operand: Box<Unit>,
    },
    /// A parenthesized expression used purely as grouping.
    Expression(Box<Expression>),
    /// A map literal.
    Map(Map),
    /// A list literal.
    List(List),
    /// A tuple literal, including the empty tuple `()`.
    Tuple(Tuple),
    /// A lambda, e.g. `(x, y) -> x + y`.
    Lambda(Define),
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Unit:
///     ('+' | '-' | '~' | 'not') Unit
///     | '(' Expression ')'
///     | Map
///     | List
///     | Tuple
///     | Lambda
///     ;
/// ```
///
/// The parenthesis cases are disambiguated by inspecting the already parsed
/// expressions, see [`Parser::parse_unit`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Unit {
    location: Location,
    /// Which kind of unit this is.
    #[get = "pub"]
    kind: UnitKind,
}

impl SourceElement for Unit {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Unit {
    fn render(&self, depth: usize) -> String {
        match &self.kind {
            UnitKind::Unary { op, operand } => {
                format!("{}Unary '{op}'\n{}", indent(depth), operand.render(depth + 1))
            }
            UnitKind::Expression(expression) => {
                format!("{}Grouping\n{}", indent(depth), expression.render(depth + 1))
            }
            UnitKind::Map(map) => map.render(depth),
            UnitKind::List(list) => list.render(depth),
            UnitKind::Tuple(tuple) => tuple.render(depth),
            UnitKind::Lambda(lambda) => lambda.render(depth),
        }
    }
}

/// The primary of a [`Component`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum ComponentBase {
    Name(Name),
    Pair(Pair),
    Unit(Unit),
    Constant(Constant),
}

impl SourceElement for ComponentBase {
    fn location(&self) -> Location {
        match self {
            Self::Name(name) => name.location(),
            Self::Pair(pair) => pair.location(),
            Self::Unit(unit) => unit.location(),
            Self::Constant(constant) => constant.location(),
        }
    }
}

impl Render for ComponentBase {
    fn render(&self, depth: usize) -> String {
        match self {
            Self::Name(name) => name.render(depth),
            Self::Pair(pair) => pair.render(depth),
            Self::Unit(unit) => unit.render(depth),
            Self::Constant(constant) => constant.render(depth),
        }
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Attribute:
///     '.' Name
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Attribute {
    location: Location,
    /// The accessed attribute name.
    #[get = "pub"]
    name: Name,
}

impl SourceElement for Attribute {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Attribute {
    fn render(&self, depth: usize) -> String {
        format!("{}Attribute\n{}", indent(depth), self.name.render(depth + 1))
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Index:
///     '[' Expression ']'
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Index {
    location: Location,
    /// The index expression.
    #[get = "pub"]
    index: Box<Expression>,
}

impl SourceElement for Index {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Index {
    fn render(&self, depth: usize) -> String {
        format!("{}Index\n{}", indent(depth), self.index.render(depth + 1))
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Invoke:
///     '(' (Expression (',' Expression)*)? ')'
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Invoke {
    location: Location,
    /// The call arguments, in source order.
    #[get = "pub"]
    args: Vec<Expression>,
}

impl SourceElement for Invoke {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Invoke {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Invoke\n", indent(depth));
        for arg in &self.args {
            result += &arg.render(depth + 1);
        }
        result
    }
}

/// A postfix modifier of a [`Component`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum Modifier {
    Attribute(Attribute),
    Index(Index),
    Invoke(Invoke),
}

impl SourceElement for Modifier {
    fn location(&self) -> Location {
        match self {
            Self::Attribute(attribute) => attribute.location(),
            Self::Index(index) => index.location(),
            Self::Invoke(invoke) => invoke.location(),
        }
    }
}

impl Render for Modifier {
    fn render(&self, depth: usize) -> String {
        match self {
            Self::Attribute(attribute) => attribute.render(depth),
            Self::Index(index) => index.render(depth),
            Self::Invoke(invoke) => invoke.render(depth),
        }
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Component:
///     (Name | Pair | Unit | Constant) (Attribute | Index | Invoke)*
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Component {
    location: Location,
    /// The primary of the component.
    #[get = "pub"]
    base: ComponentBase,
    /// The postfix modifiers, in application order.
    #[get = "pub"]
    modifiers: Vec<Modifier>,
}

impl SourceElement for Component {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Component {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Component\n", indent(depth));
        result += &self.base.render(depth + 1);
        for modifier in &self.modifiers {
            result += &modifier.render(depth + 1);
        }
        result
    }
}

/// One term of an [`Expression`] chain.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum ExpressionTerm {
    Component(Component),
    Expression(Box<Expression>),
}

impl SourceElement for ExpressionTerm {
    fn location(&self) -> Location {
        match self {
            Self::Component(component) => component.location(),
            Self::Expression(expression) => expression.location(),
        }
    }
}

impl Render for ExpressionTerm {
    fn render(&self, depth: usize) -> String {
        match self {
            Self::Component(component) => component.render(depth),
            Self::Expression(expression) => expression.render(depth),
        }
    }
}

/// One precedence level's worth of expression.
///
/// Every level of the cascade produces one of these, even a level that
/// consumed no operator of its own: the single-term wrapper keeps the return
/// type uniform across all levels. The chain is flat, not a binary spine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Expression {
    location: Location,
    /// The first term of the chain.
    #[get = "pub"]
    first: ExpressionTerm,
    /// The trailing `(operator, term)` pairs of the chain, in source order.
    #[get = "pub"]
    chain: Vec<(OperatorKind, ExpressionTerm)>,
    /// The prefix operator, if this is a unary wrapper.
    #[get_copy = "pub"]
    unary: Option<OperatorKind>,
    /// Whether this chain was built at the relations level and must be
    /// evaluated as a logical AND of consecutive comparisons.
    #[get_copy = "pub"]
    is_relations: bool,
}

impl Expression {
    fn new(location: Location, first: ExpressionTerm) -> Self {
        Self {
            location,
            first,
            chain: Vec::new(),
            unary: None,
            is_relations: false,
        }
    }

    fn new_unary(location: Location, op: OperatorKind, operand: Self) -> Self {
        Self {
            location,
            first: ExpressionTerm::Expression(Box::new(operand)),
            chain: Vec::new(),
            unary: Some(op),
            is_relations: false,
        }
    }

    fn from_component(component: Component) -> Self {
        Self::new(component.location(), ExpressionTerm::Component(component))
    }

    fn push_chain(&mut self, op: OperatorKind, term: ExpressionTerm) {
        self.chain.push((op, term));
    }

    /// Reinterprets the expression as a lambda parameter name, without
    /// mutating it.
    ///
    /// Descends through single-term, chainless, non-unary wrapper levels;
    /// succeeds only if the unwrapped leaf is a bare [`Name`] component with
    /// no modifiers. Constants, calls, attribute accesses and multi-term
    /// chains all fail.
    #[must_use]
    pub fn as_argument_name(&self) -> Option<&Name> {
        let mut expression = self;

        loop {
            if expression.unary.is_some() || !expression.chain.is_empty() {
                return None;
            }

            match &expression.first {
                ExpressionTerm::Expression(inner) => expression = inner,
                ExpressionTerm::Component(component) => {
                    if !component.modifiers.is_empty() {
                        return None;
                    }

                    return component.base.as_name();
                }
            }
        }
    }

    fn is_pointer_pair(&self) -> bool {
        let mut expression = self;

        loop {
            if expression.unary.is_some() || !expression.chain.is_empty() {
                return false;
            }

            match &expression.first {
                ExpressionTerm::Expression(inner) => expression = inner,
                ExpressionTerm::Component(component) => {
                    return component.modifiers.is_empty() && component.base.is_pair();
                }
            }
        }
    }

    /// Reinterprets the expression as a map-entry pointer pair, splitting it
    /// into the name and the value expression.
    ///
    /// Performs the same wrapper walk as [`Self::as_argument_name`]; succeeds
    /// only if the unwrapped leaf is an unmodified [`Pair`] component. On
    /// failure the expression is handed back intact, so the caller can keep
    /// using the already-built subtree.
    ///
    /// # Errors
    /// - Returns the expression unchanged if it is not a pointer pair.
    pub fn into_pointer_pair(self) -> Result<(Name, Expression), Box<Expression>> {
        if !self.is_pointer_pair() {
            return Err(Box::new(self));
        }

        let mut expression = self;

        loop {
            match expression.first {
                ExpressionTerm::Expression(inner) => expression = *inner,
                ExpressionTerm::Component(component) => {
                    let ComponentBase::Pair(pair) = component.base else {
                        unreachable!("checked by is_pointer_pair");
                    };

                    return Ok((pair.name, *pair.value));
                }
            }
        }
    }
}

impl SourceElement for Expression {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Expression {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Expression\n", indent(depth));

        if let Some(op) = self.unary {
            result += &format!("{}Unary '{op}'\n", indent(depth + 1));
        }

        result += &format!("{}First\n", indent(depth + 1));
        result += &self.first.render(depth + 2);

        for (op, term) in &self.chain {
            result += &format!("{}Chained '{op}'\n", indent(depth + 1));
            result += &term.render(depth + 2);
        }

        result
    }
}

const RELATION_OPERATORS: &[OperatorKind] = &[
    OperatorKind::Is,
    OperatorKind::In,
    OperatorKind::Leq,
    OperatorKind::Geq,
    OperatorKind::Neq,
    OperatorKind::Equ,
    OperatorKind::Less,
    OperatorKind::Greater,
];

impl Parser {
    /// Parses a [`Name`] from a single identifier token.
    pub(crate) fn parse_name(&mut self) -> Result<Name, SyntaxError> {
        let token = self.tk.next_token()?;

        Ok(Name {
            location: token.location(),
            name: token.as_identifier()?.to_owned(),
        })
    }

    fn parse_constant(&mut self) -> Result<Constant, SyntaxError> {
        let token = self.tk.next_token()?;
        let location = token.location();

        let value = match token.kind() {
            TokenKind::Float(value) => ConstantValue::Float(*value),
            TokenKind::Integer(value) => ConstantValue::Integer(*value),
            TokenKind::String(value) => ConstantValue::String(value.clone()),
            _ => {
                return Err(SyntaxError::at(
                    location,
                    format!("Unexpected token {token}"),
                ))
            }
        };

        Ok(Constant { location, value })
    }

    fn parse_attribute(&mut self) -> Result<Attribute, SyntaxError> {
        let token = self.expect_operator(OperatorKind::Point)?;

        Ok(Attribute {
            location: token.location(),
            name: self.parse_name()?,
        })
    }

    fn parse_index(&mut self) -> Result<Index, SyntaxError> {
        let token = self.expect_operator(OperatorKind::IndexLeft)?;
        let index = Box::new(self.parse_expression()?);
        self.expect_operator(OperatorKind::IndexRight)?;

        Ok(Index {
            location: token.location(),
            index,
        })
    }

    fn parse_invoke(&mut self) -> Result<Invoke, SyntaxError> {
        let token = self.expect_operator(OperatorKind::BracketLeft)?;
        let mut args = Vec::new();

        if !self.is_operator(OperatorKind::BracketRight)? {
            loop {
                args.push(self.parse_expression()?);

                if !self.skip_operator(OperatorKind::Comma)? {
                    break;
                }
            }
        }

        self.expect_operator(OperatorKind::BracketRight)?;

        Ok(Invoke {
            location: token.location(),
            args,
        })
    }

    /// Parses a [`Map`] literal. The opening `{` is already consumed.
    fn parse_map(&mut self, location: Location) -> Result<Map, SyntaxError> {
        let mut items = Vec::new();

        while !self.is_operator(OperatorKind::BlockRight)? {
            let item = self.parse_expression()?;

            match item.into_pointer_pair() {
                Ok((name, value)) => {
                    // pointer-pair shorthand, the key becomes a string constant
                    let key_location = name.location();
                    let key = Expression::from_component(Component {
                        location: key_location,
                        base: ComponentBase::Constant(Constant {
                            location: key_location,
                            value: ConstantValue::String(name.name),
                        }),
                        modifiers: Vec::new(),
                    });

                    items.push((key, value));
                }
                Err(item) => {
                    self.expect_operator(OperatorKind::Colon)?;
                    items.push((*item, self.parse_expression()?));
                }
            }

            // single comma at the end of the map is supported
            if !self.skip_operator(OperatorKind::Comma)?
                && !self.is_operator(OperatorKind::BlockRight)?
            {
                return Err(SyntaxError::at(
                    self.tk.location(),
                    "Operator \",\" expected",
                ));
            }
        }

        self.expect_operator(OperatorKind::BlockRight)?;
        Ok(Map { location, items })
    }

    /// Parses a [`List`] literal. The opening `[` is already consumed.
    fn parse_list(&mut self, location: Location) -> Result<List, SyntaxError> {
        let mut items = Vec::new();

        while !self.is_operator(OperatorKind::IndexRight)? {
            items.push(self.parse_expression()?);

            // single comma at the end of the list is supported
            if !self.skip_operator(OperatorKind::Comma)?
                && !self.is_operator(OperatorKind::IndexRight)?
            {
                return Err(SyntaxError::at(
                    self.tk.location(),
                    "Operator \",\" expected",
                ));
            }
        }

        self.expect_operator(OperatorKind::IndexRight)?;
        Ok(List { location, items })
    }

    /// Parses a [`Unit`], dispatching on the opening operator.
    ///
    /// The `(` case is the disambiguation core: a parenthesized item list may
    /// turn out to be a grouping, a tuple literal or a lambda parameter list.
    /// The decision is made by inspecting the already-built expressions with
    /// [`Expression::as_argument_name`] before the pointer operator is
    /// consumed, so the tuple fallback reuses the parsed subtrees verbatim.
    fn parse_unit(&mut self) -> Result<Unit, SyntaxError> {
        let token = self.tk.next_token()?;
        let location = token.location();

        let kind = match token.as_operator()? {
            OperatorKind::BlockLeft => UnitKind::Map(self.parse_map(location)?),
            OperatorKind::IndexLeft => UnitKind::List(self.parse_list(location)?),

            op @ (OperatorKind::Plus
            | OperatorKind::Minus
            | OperatorKind::BitNot
            | OperatorKind::BoolNot) => UnitKind::Unary {
                op,
                operand: Box::new(self.parse_unit()?),
            },

            OperatorKind::BracketLeft => self.parse_bracketed_unit(location)?,

            _ => {
                return Err(SyntaxError::at(
                    location,
                    format!("Unexpected token {token}"),
                ))
            }
        };

        Ok(Unit { location, kind })
    }

    fn parse_bracketed_unit(&mut self, location: Location) -> Result<UnitKind, SyntaxError> {
        // `()` is an empty tuple, `() ->` a zero-argument lambda
        if self.skip_operator(OperatorKind::BracketRight)? {
            return if self.skip_operator(OperatorKind::Pointer)? {
                Ok(UnitKind::Lambda(self.parse_lambda(location, Vec::new())?))
            } else {
                Ok(UnitKind::Tuple(Tuple::new(location, Vec::new())))
            };
        }

        // first argument, first element or nested expression, they all look
        // the same at this point
        let first = self.parse_expression()?;

        if self.skip_operator(OperatorKind::BracketRight)? {
            // one-argument lambda iff a pointer operator follows and the
            // expression reinterprets as a parameter name
            if self.is_operator(OperatorKind::Pointer)? {
                if let Some(name) = first.as_argument_name().cloned() {
                    self.expect_operator(OperatorKind::Pointer)?;
                    return Ok(UnitKind::Lambda(self.parse_lambda(location, vec![name])?));
                }
            }

            return Ok(UnitKind::Expression(Box::new(first)));
        }

        // tuple literal, or maybe a multi-argument lambda
        let mut maybe_lambda = true;
        let mut items = vec![first];

        while self.skip_operator(OperatorKind::Comma)? {
            // a trailing comma forces a tuple literal
            if self.is_operator(OperatorKind::BracketRight)? {
                maybe_lambda = false;
                break;
            }

            items.push(self.parse_expression()?);
        }

        self.expect_operator(OperatorKind::BracketRight)?;

        if maybe_lambda && self.is_operator(OperatorKind::Pointer)? {
            // all-or-nothing: every item must reinterpret as a parameter name
            let params: Option<Vec<Name>> = items
                .iter()
                .map(|item| item.as_argument_name().cloned())
                .collect();

            if let Some(params) = params {
                self.expect_operator(OperatorKind::Pointer)?;
                return Ok(UnitKind::Lambda(self.parse_lambda(location, params)?));
            }
        }

        Ok(UnitKind::Tuple(Tuple::new(location, items)))
    }

    /// Parses a [`Component`]: one primary plus its postfix modifier chain.
    pub(crate) fn parse_component(&mut self) -> Result<Component, SyntaxError> {
        let token = self.tk.peek_token()?;
        let location = token.location();

        let base = match token.kind() {
            TokenKind::Eof | TokenKind::Keyword(_) => {
                return Err(SyntaxError::at(
                    location,
                    format!("Unexpected token {token}"),
                ))
            }

            TokenKind::Float(_) | TokenKind::Integer(_) | TokenKind::String(_) => {
                ComponentBase::Constant(self.parse_constant()?)
            }

            TokenKind::Operator(_) => ComponentBase::Unit(self.parse_unit()?),

            TokenKind::Identifier(_) => {
                let name = self.parse_name()?;

                if self.skip_operator(OperatorKind::Pointer)? {
                    ComponentBase::Pair(Pair {
                        location: name.location(),
                        name,
                        value: Box::new(self.parse_expression()?),
                    })
                } else {
                    ComponentBase::Name(name)
                }
            }
        };

        let mut modifiers = Vec::new();

        loop {
            let token = self.tk.peek_line()?;
            let TokenKind::Operator(op) = *token.kind() else {
                break;
            };

            match op {
                OperatorKind::Point => {
                    modifiers.push(Modifier::Attribute(self.parse_attribute()?));
                }

                OperatorKind::IndexLeft => {
                    modifiers.push(Modifier::Index(self.parse_index()?));
                }

                OperatorKind::BracketLeft => {
                    modifiers.push(Modifier::Invoke(self.parse_invoke()?));
                }

                // only attribute access may wrap to the next line: peek past
                // the newlines under a checkpoint and continue only into '.'
                OperatorKind::NewLine => {
                    self.tk.push_state();

                    if self.is_operator(OperatorKind::Point)? {
                        self.tk.commit_state();
                        modifiers.push(Modifier::Attribute(self.parse_attribute()?));
                    } else {
                        self.tk.pop_state();
                        break;
                    }
                }

                _ => break,
            }
        }

        Ok(Component {
            location,
            base,
            modifiers,
        })
    }

    /// Parses an [`Expression`], the entry point of the precedence cascade.
    pub fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_bool_or()
    }

    fn parse_chain(
        &mut self,
        operators: &[OperatorKind],
        next: fn(&mut Self) -> Result<Expression, SyntaxError>,
    ) -> Result<Expression, SyntaxError> {
        let inner = next(self)?;
        let mut result = Expression::new(
            inner.location(),
            ExpressionTerm::Expression(Box::new(inner)),
        );

        while let Some(op) = self.read_operators(operators)? {
            result.push_chain(op, ExpressionTerm::Expression(Box::new(next(self)?)));
        }

        Ok(result)
    }

    fn parse_power(&mut self) -> Result<Expression, SyntaxError> {
        let first = self.parse_component()?;
        let mut result = Expression::from_component(first);

        while let Some(op) = self.read_operators(&[OperatorKind::Power])? {
            result.push_chain(op, ExpressionTerm::Component(self.parse_component()?));
        }

        Ok(result)
    }

    fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        let location = self.tk.peek_token()?.location();

        if let Some(op) = self.read_operators(&[
            OperatorKind::Plus,
            OperatorKind::Minus,
            OperatorKind::BitNot,
        ])? {
            Ok(Expression::new_unary(location, op, self.parse_unary()?))
        } else {
            self.parse_power()
        }
    }

    fn parse_factor(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(
            &[
                OperatorKind::Multiply,
                OperatorKind::Divide,
                OperatorKind::Modulo,
            ],
            Self::parse_unary,
        )
    }

    fn parse_term(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(
            &[OperatorKind::Plus, OperatorKind::Minus],
            Self::parse_factor,
        )
    }

    fn parse_bit_shift(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(
            &[OperatorKind::ShiftLeft, OperatorKind::ShiftRight],
            Self::parse_term,
        )
    }

    fn parse_bit_and(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(&[OperatorKind::BitAnd], Self::parse_bit_shift)
    }

    fn parse_bit_xor(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(&[OperatorKind::BitXor], Self::parse_bit_and)
    }

    fn parse_bit_or(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(&[OperatorKind::BitOr], Self::parse_bit_xor)
    }

    /// Parses the relations level, synthesizing the two-token forms
    /// `is not` and `not in` into the single tags
    /// [`OperatorKind::IsNot`] and [`OperatorKind::NotIn`].
    fn parse_relations(&mut self) -> Result<Expression, SyntaxError> {
        let inner = self.parse_bit_or()?;
        let mut result = Expression::new(
            inner.location(),
            ExpressionTerm::Expression(Box::new(inner)),
        );

        loop {
            if self.skip_operator(OperatorKind::BoolNot)? {
                self.expect_operator(OperatorKind::In)?;

                let term = ExpressionTerm::Expression(Box::new(self.parse_bit_or()?));
                result.push_chain(OperatorKind::NotIn, term);
            } else {
                let Some(op) = self.read_operators(RELATION_OPERATORS)? else {
                    break;
                };

                let op = if op == OperatorKind::Is && self.skip_operator(OperatorKind::BoolNot)? {
                    OperatorKind::IsNot
                } else {
                    op
                };

                let term = ExpressionTerm::Expression(Box::new(self.parse_bit_or()?));
                result.push_chain(op, term);
            }
        }

        result.is_relations = true;
        Ok(result)
    }

    fn parse_bool_not(&mut self) -> Result<Expression, SyntaxError> {
        let location = self.tk.peek_token()?.location();

        if self.skip_operator(OperatorKind::BoolNot)? {
            Ok(Expression::new_unary(
                location,
                OperatorKind::BoolNot,
                self.parse_bool_not()?,
            ))
        } else {
            self.parse_relations()
        }
    }

    fn parse_bool_and(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(&[OperatorKind::BoolAnd], Self::parse_bool_not)
    }

    fn parse_bool_or(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_chain(&[OperatorKind::BoolOr], Self::parse_bool_and)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenizer::Tokenizer;

    fn parse_expr(source: &str) -> Expression {
        Parser::new(Tokenizer::new(source))
            .parse_expression()
            .expect("expression must parse")
    }

    fn chain_operators(expression: &Expression) -> Vec<OperatorKind> {
        fn collect(expression: &Expression, result: &mut Vec<OperatorKind>) {
            if let ExpressionTerm::Expression(inner) = expression.first() {
                collect(inner, result);
            }
            for (op, term) in expression.chain() {
                result.push(*op);
                if let ExpressionTerm::Expression(inner) = term {
                    collect(inner, result);
                }
            }
        }

        let mut result = Vec::new();
        collect(expression, &mut result);
        result
    }

    #[test]
    fn same_level_operators_stay_in_one_chain() {
        let expression = parse_expr("a - b - c");

        // the '-' applications form one flat two-element chain, not a spine
        fn find_term_chain(expression: &Expression) -> Option<&Expression> {
            if expression
                .chain()
                .iter()
                .any(|(op, _)| *op == OperatorKind::Minus)
            {
                return Some(expression);
            }
            match expression.first() {
                ExpressionTerm::Expression(inner) => find_term_chain(inner),
                ExpressionTerm::Component(_) => None,
            }
        }

        let term = find_term_chain(&expression).expect("chain must exist");
        assert_eq!(term.chain().len(), 2);
    }

    #[test]
    fn relation_synthesis() {
        assert!(chain_operators(&parse_expr("a is not b")).contains(&OperatorKind::IsNot));
        assert!(chain_operators(&parse_expr("a not in b")).contains(&OperatorKind::NotIn));
        assert!(chain_operators(&parse_expr("a is b")).contains(&OperatorKind::Is));
        assert!(chain_operators(&parse_expr("a in b")).contains(&OperatorKind::In));
    }

    #[test]
    fn argument_name_extraction() {
        assert_eq!(
            parse_expr("x").as_argument_name().map(Name::name),
            Some(&"x".to_owned())
        );

        // anything but a bare unmodified name fails extraction
        assert!(parse_expr("x.y").as_argument_name().is_none());
        assert!(parse_expr("x()").as_argument_name().is_none());
        assert!(parse_expr("1").as_argument_name().is_none());
        assert!(parse_expr("x + y").as_argument_name().is_none());
        assert!(parse_expr("-x").as_argument_name().is_none());
    }

    #[test]
    fn unary_wrapper_reports_its_operator() {
        fn find_unary(expression: &Expression) -> Option<&Expression> {
            if expression.unary().is_some() {
                return Some(expression);
            }
            match expression.first() {
                ExpressionTerm::Expression(inner) => find_unary(inner),
                ExpressionTerm::Component(_) => None,
            }
        }

        // the prefix parsers build the wrapper, the getter reads it back
        let expression = parse_expr("-x");
        assert_eq!(expression.unary(), None);
        let unary = find_unary(&expression).expect("unary wrapper must exist");
        assert_eq!(unary.unary(), Some(OperatorKind::Minus));

        let expression = parse_expr("not x");
        let unary = find_unary(&expression).expect("unary wrapper must exist");
        assert_eq!(unary.unary(), Some(OperatorKind::BoolNot));
    }

    #[test]
    fn pointer_pair_unpacking() {
        let (name, _) = parse_expr("a -> 1")
            .into_pointer_pair()
            .expect("pair must unpack");
        assert_eq!(name.name(), "a");

        let expression = parse_expr("a + 1");
        assert!(expression.into_pointer_pair().is_err());
    }
}
