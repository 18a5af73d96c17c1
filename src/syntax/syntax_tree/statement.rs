//! Syntax tree nodes for statements, and the statement-level parsing
//! functions including the assignment/in-place/expression speculation.

use derive_more::From;
use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};

use crate::{
    base::{
        source_file::{Location, SourceElement},
        SyntaxError,
    },
    lexical::token::{KeywordKind, OperatorKind, TokenKind},
    syntax::parser::Parser,
};

use super::{
    declaration::{Define, Import},
    expression::{Component, Expression, Name, Tuple},
    indent, Render,
};

/// Syntax Synopsis:
///
/// ``` ebnf
/// Statement:
///     Block
///     | If | For | While | Try
///     | Define | Import
///     | Assign | InPlace | Delete
///     | Break | Continue | Return | Raise
///     | TupleExpression ('\n' | ';')
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum Statement {
    Block(Block),
    If(If),
    For(For),
    While(While),
    Try(Try),
    Define(Define),
    Import(Import),
    Assign(Assign),
    InPlace(InPlace),
    Delete(Delete),
    Break(Break),
    Continue(Continue),
    Return(Return),
    Raise(Raise),
    Expression(ExpressionStatement),
}

impl SourceElement for Statement {
    fn location(&self) -> Location {
        match self {
            Self::Block(block) => block.location(),
            Self::If(if_statement) => if_statement.location(),
            Self::For(for_statement) => for_statement.location(),
            Self::While(while_statement) => while_statement.location(),
            Self::Try(try_statement) => try_statement.location(),
            Self::Define(define) => define.location(),
            Self::Import(import) => import.location(),
            Self::Assign(assign) => assign.location(),
            Self::InPlace(inplace) => inplace.location(),
            Self::Delete(delete) => delete.location(),
            Self::Break(break_statement) => break_statement.location(),
            Self::Continue(continue_statement) => continue_statement.location(),
            Self::Return(return_statement) => return_statement.location(),
            Self::Raise(raise) => raise.location(),
            Self::Expression(expression) => expression.location(),
        }
    }
}

impl Render for Statement {
    fn render(&self, depth: usize) -> String {
        match self {
            Self::Block(block) => block.render(depth),
            Self::If(if_statement) => if_statement.render(depth),
            Self::For(for_statement) => for_statement.render(depth),
            Self::While(while_statement) => while_statement.render(depth),
            Self::Try(try_statement) => try_statement.render(depth),
            Self::Define(define) => define.render(depth),
            Self::Import(import) => import.render(depth),
            Self::Assign(assign) => assign.render(depth),
            Self::InPlace(inplace) => inplace.render(depth),
            Self::Delete(delete) => delete.render(depth),
            Self::Break(break_statement) => break_statement.render(depth),
            Self::Continue(continue_statement) => continue_statement.render(depth),
            Self::Return(return_statement) => return_statement.render(depth),
            Self::Raise(raise) => raise.render(depth),
            Self::Expression(expression) => expression.render(depth),
        }
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Block:
///     '{' Statement* '}'
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Block {
    location: Location,
    /// The statements of the block, in source order.
    #[get = "pub"]
    statements: Vec<Statement>,
}

impl SourceElement for Block {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Block {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Block\n", indent(depth));
        for statement in &self.statements {
            result += &statement.render(depth + 1);
        }
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// If:
///     'if' '(' Expression ')' Statement ('else' Statement)?
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct If {
    location: Location,
    /// The branch condition.
    #[get = "pub"]
    condition: Expression,
    /// The statement taken when the condition holds.
    #[get = "pub"]
    then_branch: Box<Statement>,
    /// The optional `else` statement.
    #[get = "pub"]
    else_branch: Option<Box<Statement>>,
}

impl SourceElement for If {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for If {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}If\n", indent(depth));
        result += &format!("{}Condition\n", indent(depth + 1));
        result += &self.condition.render(depth + 2);
        result += &format!("{}Then\n", indent(depth + 1));
        result += &self.then_branch.render(depth + 2);

        if let Some(else_branch) = &self.else_branch {
            result += &format!("{}Else\n", indent(depth + 1));
            result += &else_branch.render(depth + 2);
        }

        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// For:
///     'for' '(' TargetList 'in' Expression ')' Statement
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct For {
    location: Location,
    /// The iteration targets.
    #[get = "pub"]
    targets: Sequence,
    /// The iterated expression.
    #[get = "pub"]
    iterable: Expression,
    /// The loop body.
    #[get = "pub"]
    body: Box<Statement>,
}

impl SourceElement for For {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for For {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}For\n", indent(depth));
        result += &format!("{}Targets\n", indent(depth + 1));
        result += &self.targets.render(depth + 2);
        result += &format!("{}Iterable\n", indent(depth + 1));
        result += &self.iterable.render(depth + 2);
        result += &format!("{}Body\n", indent(depth + 1));
        result += &self.body.render(depth + 2);
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// While:
///     'while' '(' Expression ')' Statement
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct While {
    location: Location,
    /// The loop condition.
    #[get = "pub"]
    condition: Expression,
    /// The loop body.
    #[get = "pub"]
    body: Box<Statement>,
}

impl SourceElement for While {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for While {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}While\n", indent(depth));
        result += &format!("{}Condition\n", indent(depth + 1));
        result += &self.condition.render(depth + 2);
        result += &format!("{}Body\n", indent(depth + 1));
        result += &self.body.render(depth + 2);
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Try:
///     'try' Statement Except* ('finally' Statement)?
///     ;
/// ```
///
/// At least one handler or a finally statement is required.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Try {
    location: Location,
    /// The guarded statement.
    #[get = "pub"]
    body: Box<Statement>,
    /// The exception handlers, in source order.
    #[get = "pub"]
    handlers: Vec<Except>,
    /// The optional `finally` statement.
    #[get = "pub"]
    finally: Option<Box<Statement>>,
}

impl SourceElement for Try {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Try {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Try\n", indent(depth));
        result += &format!("{}Body\n", indent(depth + 1));
        result += &self.body.render(depth + 2);

        for handler in &self.handlers {
            result += &handler.render(depth + 1);
        }

        if let Some(finally) = &self.finally {
            result += &format!("{}Finally\n", indent(depth + 1));
            result += &finally.render(depth + 2);
        }

        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Except:
///     'except' ('(' Expression (',' Expression)* ('as' Name)? ')')? Statement
///     ;
/// ```
///
/// The form without an exception-type list is the wildcard handler.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Except {
    location: Location,
    /// The matched exception types, empty for the wildcard handler.
    #[get = "pub"]
    types: Vec<Expression>,
    /// The name the caught exception is bound to.
    #[get = "pub"]
    binding: Option<Name>,
    /// Whether this handler catches everything.
    #[get_copy = "pub"]
    is_wildcard: bool,
    /// The handler body.
    #[get = "pub"]
    body: Box<Statement>,
}

impl SourceElement for Except {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Except {
    fn render(&self, depth: usize) -> String {
        let mut result = if self.is_wildcard {
            format!("{}Except Wildcard\n", indent(depth))
        } else {
            format!("{}Except\n", indent(depth))
        };

        if !self.types.is_empty() {
            result += &format!("{}Types\n", indent(depth + 1));
            for exception_type in &self.types {
                result += &exception_type.render(depth + 2);
            }
        }

        if let Some(binding) = &self.binding {
            result += &format!("{}As\n", indent(depth + 1));
            result += &binding.render(depth + 2);
        }

        result += &format!("{}Body\n", indent(depth + 1));
        result += &self.body.render(depth + 2);
        result
    }
}

/// An item of a destructuring [`Sequence`]: either a nested sequence or a
/// single mutable component.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum SequenceItem {
    Sequence(Sequence),
    Component(Component),
}

impl SourceElement for SequenceItem {
    fn location(&self) -> Location {
        match self {
            Self::Sequence(sequence) => sequence.location(),
            Self::Component(component) => component.location(),
        }
    }
}

impl Render for SequenceItem {
    fn render(&self, depth: usize) -> String {
        match self {
            Self::Sequence(sequence) => sequence.render(depth),
            Self::Component(component) => component.render(depth),
        }
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Sequence:
///     (SequenceItem ',')+ SequenceItem?
///     ;
/// ```
///
/// The comma-separated target list of an assignment or a for loop. A
/// parenthesized sequence with exactly one item must carry a trailing comma,
/// so that `(x,)` destructures while `(x)` stays a grouping.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Sequence {
    location: Location,
    /// The target items, in source order.
    #[get = "pub"]
    items: Vec<SequenceItem>,
    /// Whether the targets destructure the assigned value.
    #[get_copy = "pub"]
    is_destructuring: bool,
}

impl SourceElement for Sequence {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Sequence {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Sequence\n", indent(depth));
        for item in &self.items {
            result += &item.render(depth + 1);
        }
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Assign:
///     TargetList '=' TupleExpression
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Assign {
    location: Location,
    /// The assignment targets.
    #[get = "pub"]
    targets: Sequence,
    /// The assigned value or tuple of values.
    #[get = "pub"]
    value: Tuple,
    /// Whether the value side used the comma-separated tuple form.
    #[get_copy = "pub"]
    is_tuple: bool,
}

impl SourceElement for Assign {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Assign {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Assign\n", indent(depth));
        result += &format!("{}Targets\n", indent(depth + 1));
        result += &self.targets.render(depth + 2);
        result += &format!("{}Value\n", indent(depth + 1));
        result += &self.value.render(depth + 2);
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// InPlace:
///     Component ('+=' | '-=' | '*=' | '/=' | '%=' | '**=' | '&=' | '|=' | '^=' | '<<=' | '>>=') Expression
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct InPlace {
    location: Location,
    /// The mutated target.
    #[get = "pub"]
    target: Component,
    /// The in-place operator.
    #[get_copy = "pub"]
    op: OperatorKind,
    /// The applied value.
    #[get = "pub"]
    value: Expression,
}

impl SourceElement for InPlace {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for InPlace {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}InPlace '{}'\n", indent(depth), self.op);
        result += &format!("{}Target\n", indent(depth + 1));
        result += &self.target.render(depth + 2);
        result += &format!("{}Value\n", indent(depth + 1));
        result += &self.value.render(depth + 2);
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Delete:
///     'delete' Component
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Delete {
    location: Location,
    /// The deleted target, which must be mutable.
    #[get = "pub"]
    target: Component,
}

impl SourceElement for Delete {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Delete {
    fn render(&self, depth: usize) -> String {
        format!("{}Delete\n{}", indent(depth), self.target.render(depth + 1))
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Break: 'break' ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    location: Location,
}

impl SourceElement for Break {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Break {
    fn render(&self, depth: usize) -> String {
        format!("{}Break\n", indent(depth))
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Continue: 'continue' ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continue {
    location: Location,
}

impl SourceElement for Continue {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Continue {
    fn render(&self, depth: usize) -> String {
        format!("{}Continue\n", indent(depth))
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Return:
///     'return' TupleExpression
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Return {
    location: Location,
    /// The returned value or tuple of values.
    #[get = "pub"]
    value: Tuple,
    /// Whether the value used the comma-separated tuple form.
    #[get_copy = "pub"]
    is_tuple: bool,
}

impl SourceElement for Return {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Return {
    fn render(&self, depth: usize) -> String {
        format!("{}Return\n{}", indent(depth), self.value.render(depth + 1))
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Raise:
///     'raise' Expression
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Raise {
    location: Location,
    /// The raised exception value.
    #[get = "pub"]
    value: Expression,
}

impl SourceElement for Raise {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Raise {
    fn render(&self, depth: usize) -> String {
        format!("{}Raise\n{}", indent(depth), self.value.render(depth + 1))
    }
}

/// A bare expression (or comma-separated tuple of expressions) in statement
/// position, terminated by a soft newline, a `;` or the end of the input.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct ExpressionStatement {
    location: Location,
    /// The expressions of the statement.
    #[get = "pub"]
    tuple: Tuple,
    /// Whether the comma-separated tuple form was used.
    #[get_copy = "pub"]
    is_tuple: bool,
}

impl SourceElement for ExpressionStatement {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for ExpressionStatement {
    fn render(&self, depth: usize) -> String {
        self.tuple.render(depth)
    }
}

const INPLACE_OPERATORS: &[OperatorKind] = &[
    OperatorKind::InplaceAdd,
    OperatorKind::InplaceSub,
    OperatorKind::InplaceMul,
    OperatorKind::InplaceDiv,
    OperatorKind::InplaceMod,
    OperatorKind::InplacePower,
    OperatorKind::InplaceBitAnd,
    OperatorKind::InplaceBitOr,
    OperatorKind::InplaceBitXor,
    OperatorKind::InplaceShiftLeft,
    OperatorKind::InplaceShiftRight,
];

impl Parser {
    /// Parses a [`Statement`], dispatching on the leading token.
    ///
    /// Statements that start with neither a keyword nor `{` are resolved by
    /// speculation under a tokenizer checkpoint: first as an assignment, then
    /// as an in-place operation, finally as a bare tuple expression.
    pub fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let token = self.tk.peek_token()?;
        let location = token.location();

        match token.kind() {
            TokenKind::Keyword(keyword) => match keyword {
                KeywordKind::If => Ok(Statement::If(self.parse_if()?)),
                KeywordKind::For => Ok(Statement::For(self.parse_for()?)),
                KeywordKind::While => Ok(Statement::While(self.parse_while()?)),
                KeywordKind::Try => Ok(Statement::Try(self.parse_try()?)),
                KeywordKind::Def => Ok(Statement::Define(self.parse_define()?)),
                KeywordKind::Import => Ok(Statement::Import(self.parse_import()?)),
                KeywordKind::Delete => Ok(Statement::Delete(self.parse_delete()?)),
                KeywordKind::Raise => Ok(Statement::Raise(self.parse_raise()?)),

                KeywordKind::Break => {
                    self.tk.next_token()?;

                    if self.breakable == 0 {
                        return Err(SyntaxError::at(location, "'break' outside of a loop"));
                    }

                    Ok(Statement::Break(Break { location }))
                }

                KeywordKind::Continue => {
                    self.tk.next_token()?;

                    if self.continuable == 0 {
                        return Err(SyntaxError::at(location, "'continue' outside of a loop"));
                    }

                    Ok(Statement::Continue(Continue { location }))
                }

                KeywordKind::Return => {
                    self.tk.next_token()?;

                    if self.returnable == 0 {
                        return Err(SyntaxError::at(location, "'return' outside of a function"));
                    }

                    let (value, is_tuple) = self.parse_tuple_expression()?;

                    Ok(Statement::Return(Return {
                        location,
                        value,
                        is_tuple,
                    }))
                }

                KeywordKind::Else
                | KeywordKind::Except
                | KeywordKind::Finally
                | KeywordKind::As => Err(SyntaxError::at(
                    location,
                    format!("Unexpected token {token}"),
                )),
            },

            TokenKind::Operator(OperatorKind::BlockLeft) => {
                Ok(Statement::Block(self.parse_block()?))
            }

            _ => {
                if let Some(assign) = self.try_parse_assign()? {
                    return Ok(Statement::Assign(assign));
                }

                if let Some(inplace) = self.try_parse_inplace()? {
                    return Ok(Statement::InPlace(inplace));
                }

                let (tuple, is_tuple) = self.parse_tuple_expression()?;

                Ok(Statement::Expression(ExpressionStatement {
                    location,
                    tuple,
                    is_tuple,
                }))
            }
        }
    }

    /// Parses a [`Block`] of statements.
    pub(crate) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let token = self.expect_operator(OperatorKind::BlockLeft)?;
        let mut statements = Vec::new();

        while !self.is_operator(OperatorKind::BlockRight)? {
            statements.push(self.parse_statement()?);
        }

        self.expect_operator(OperatorKind::BlockRight)?;

        Ok(Block {
            location: token.location(),
            statements,
        })
    }

    fn parse_loop_body(&mut self) -> Result<Statement, SyntaxError> {
        self.breakable += 1;
        self.continuable += 1;
        let result = self.parse_statement();
        self.breakable -= 1;
        self.continuable -= 1;
        result
    }

    fn parse_if(&mut self) -> Result<If, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::If)?;

        self.expect_operator(OperatorKind::BracketLeft)?;
        let condition = self.parse_expression()?;
        self.expect_operator(OperatorKind::BracketRight)?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.skip_keyword(KeywordKind::Else)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(If {
            location: token.location(),
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<For, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::For)?;

        self.expect_operator(OperatorKind::BracketLeft)?;
        let targets = self.parse_target_list()?;
        self.expect_operator(OperatorKind::In)?;
        let iterable = self.parse_expression()?;
        self.expect_operator(OperatorKind::BracketRight)?;

        Ok(For {
            location: token.location(),
            targets,
            iterable,
            body: Box::new(self.parse_loop_body()?),
        })
    }

    fn parse_while(&mut self) -> Result<While, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::While)?;

        self.expect_operator(OperatorKind::BracketLeft)?;
        let condition = self.parse_expression()?;
        self.expect_operator(OperatorKind::BracketRight)?;

        Ok(While {
            location: token.location(),
            condition,
            body: Box::new(self.parse_loop_body()?),
        })
    }

    fn parse_try(&mut self) -> Result<Try, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::Try)?;
        let body = Box::new(self.parse_statement()?);

        let mut handlers = Vec::new();

        while self.is_keyword(KeywordKind::Except)? {
            let except_token = self.expect_keyword(KeywordKind::Except)?;

            let (types, binding, is_wildcard) = if self.skip_operator(OperatorKind::BracketLeft)? {
                let mut types = vec![self.parse_expression()?];

                while self.skip_operator(OperatorKind::Comma)? {
                    types.push(self.parse_expression()?);
                }

                let binding = if self.skip_keyword(KeywordKind::As)? {
                    Some(self.parse_name()?)
                } else {
                    None
                };

                self.expect_operator(OperatorKind::BracketRight)?;
                (types, binding, false)
            } else {
                (Vec::new(), None, true)
            };

            handlers.push(Except {
                location: except_token.location(),
                types,
                binding,
                is_wildcard,
                body: Box::new(self.parse_statement()?),
            });
        }

        let finally = if self.skip_keyword(KeywordKind::Finally)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        if handlers.is_empty() && finally.is_none() {
            return Err(SyntaxError::at(
                token.location(),
                "'try' statement requires at least one 'except' or 'finally' clause",
            ));
        }

        Ok(Try {
            location: token.location(),
            body,
            handlers,
            finally,
        })
    }

    fn parse_delete(&mut self) -> Result<Delete, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::Delete)?;

        Ok(Delete {
            location: token.location(),
            target: self.parse_mutable_component()?,
        })
    }

    fn parse_raise(&mut self) -> Result<Raise, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::Raise)?;

        Ok(Raise {
            location: token.location(),
            value: self.parse_expression()?,
        })
    }

    /// Parses a [`Component`] in target position, which must be mutable: a
    /// bare name, or a modifier chain not ending in a call.
    fn parse_mutable_component(&mut self) -> Result<Component, SyntaxError> {
        let component = self.parse_component()?;

        let mutable = match component.modifiers().last() {
            None => component.base().is_name(),
            Some(modifier) => !modifier.is_invoke(),
        };

        if mutable {
            Ok(component)
        } else {
            Err(SyntaxError::at(
                component.location(),
                "Component must be mutable",
            ))
        }
    }

    /// Parses a parenthesized destructuring [`Sequence`]. The opening `(` is
    /// already consumed; the closing `)` is left for the caller.
    ///
    /// A sequence with exactly one item must carry a trailing comma; with two
    /// or more items the trailing comma is optional.
    fn parse_sequence(&mut self) -> Result<Sequence, SyntaxError> {
        let location = self.tk.peek_token()?.location();
        let mut items = Vec::new();

        loop {
            if self.skip_operator(OperatorKind::BracketLeft)? {
                items.push(SequenceItem::Sequence(self.parse_sequence()?));
                self.expect_operator(OperatorKind::BracketRight)?;
            } else {
                items.push(SequenceItem::Component(self.parse_mutable_component()?));
            }

            if !self.skip_operator(OperatorKind::Comma)? {
                if items.len() > 1 {
                    break;
                }

                return Err(SyntaxError::at(
                    self.tk.location(),
                    "Single-item sequences must have an extra comma",
                ));
            }

            if self.is_operator(OperatorKind::BracketRight)? {
                break;
            }
        }

        Ok(Sequence {
            location,
            items,
            is_destructuring: true,
        })
    }

    /// Parses the unparenthesized target list of an assignment or for loop:
    /// comma-separated items, each a mutable component or a parenthesized
    /// nested sequence. A single bare item needs no trailing comma here.
    fn parse_target_list(&mut self) -> Result<Sequence, SyntaxError> {
        let location = self.tk.peek_token()?.location();
        let mut items = Vec::new();
        let mut is_destructuring = false;

        loop {
            if self.skip_operator(OperatorKind::BracketLeft)? {
                items.push(SequenceItem::Sequence(self.parse_sequence()?));
                self.expect_operator(OperatorKind::BracketRight)?;
                is_destructuring = true;
            } else {
                items.push(SequenceItem::Component(self.parse_mutable_component()?));
            }

            if !self.skip_operator(OperatorKind::Comma)? {
                break;
            }

            is_destructuring = true;

            // a trailing comma is allowed, the list continues only when the
            // next token can start another target
            let next = self.tk.peek_token()?;
            let continues = matches!(next.kind(), TokenKind::Identifier(_))
                || next.kind() == &TokenKind::Operator(OperatorKind::BracketLeft);

            if !continues {
                break;
            }
        }

        Ok(Sequence {
            location,
            items,
            is_destructuring,
        })
    }

    fn try_parse_assign(&mut self) -> Result<Option<Assign>, SyntaxError> {
        let location = self.tk.peek_token()?.location();
        self.tk.push_state();

        let Ok(targets) = self.parse_target_list() else {
            self.tk.pop_state();
            return Ok(None);
        };

        match self.skip_operator(OperatorKind::Assign) {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                self.tk.pop_state();
                return Ok(None);
            }
        }

        // the '=' seals the interpretation, errors past this point are real
        self.tk.commit_state();

        let (value, is_tuple) = self.parse_tuple_expression()?;

        Ok(Some(Assign {
            location,
            targets,
            value,
            is_tuple,
        }))
    }

    fn try_parse_inplace(&mut self) -> Result<Option<InPlace>, SyntaxError> {
        let location = self.tk.peek_token()?.location();
        self.tk.push_state();

        let Ok(target) = self.parse_mutable_component() else {
            self.tk.pop_state();
            return Ok(None);
        };

        let op = match self.read_operators(INPLACE_OPERATORS) {
            Ok(Some(op)) => op,
            Ok(None) | Err(_) => {
                self.tk.pop_state();
                return Ok(None);
            }
        };

        self.tk.commit_state();

        let value = self.parse_expression()?;
        self.end_of_statement()?;

        Ok(Some(InPlace {
            location,
            target,
            op,
            value,
        }))
    }

    /// Parses a comma-separated run of expressions in statement position,
    /// consuming the terminating soft newline or semicolon.
    ///
    /// Returns the expressions and whether the comma-separated tuple form was
    /// used. The end of the input terminates without being consumed; a
    /// keyword in terminator position is an error.
    pub(crate) fn parse_tuple_expression(&mut self) -> Result<(Tuple, bool), SyntaxError> {
        let location = self.tk.peek_token()?.location();
        let mut items = Vec::new();
        let mut is_tuple = false;

        loop {
            items.push(self.parse_expression()?);

            let mut after_comma = false;
            let mut token = self.tk.peek_line()?;

            if token.kind() == &TokenKind::Operator(OperatorKind::Comma) {
                self.tk.next_line()?;
                after_comma = true;
                is_tuple = true;
                token = self.tk.peek_line()?;
            }

            match token.kind() {
                TokenKind::Eof => return Ok((Tuple::new(location, items), is_tuple)),

                TokenKind::Keyword(_) => {
                    return Err(SyntaxError::at(
                        token.location(),
                        format!("Unexpected token {token}"),
                    ))
                }

                TokenKind::Operator(OperatorKind::NewLine | OperatorKind::Semicolon) => {
                    self.tk.next_line()?;
                    return Ok((Tuple::new(location, items), is_tuple));
                }

                // any other operator flows back into expression parsing,
                // which reports it if it cannot start an expression
                TokenKind::Operator(_) => {}

                _ => {
                    if !after_comma {
                        return Err(SyntaxError::at(
                            token.location(),
                            format!("Unexpected token {token}"),
                        ));
                    }
                }
            }
        }
    }
}
