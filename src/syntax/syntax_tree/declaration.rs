//! Syntax tree nodes for declarations: function definitions (including
//! lambdas) and imports.

use getset::Getters;
use itertools::Itertools;

use crate::{
    base::{
        source_file::{Location, SourceElement},
        SyntaxError,
    },
    lexical::token::{KeywordKind, OperatorKind},
    syntax::parser::Parser,
};

use super::{expression::Name, indent, statement::Statement, Render};

/// Syntax Synopsis:
///
/// ``` ebnf
/// Define:
///     'def' Name '(' (Name (',' Name)*)? ')' Statement
///     ;
///
/// Lambda:
///     '(' (Name (',' Name)*)? ')' '->' Statement
///     ;
/// ```
///
/// A lambda is a definition without a name.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Define {
    location: Location,
    /// The name of the function, absent for lambdas.
    #[get = "pub"]
    name: Option<Name>,
    /// The parameter names, in source order.
    #[get = "pub"]
    params: Vec<Name>,
    /// The function body.
    #[get = "pub"]
    body: Box<Statement>,
}

impl SourceElement for Define {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Define {
    fn render(&self, depth: usize) -> String {
        let mut result = match &self.name {
            Some(name) => format!("{}Define {}\n", indent(depth), name.name()),
            None => format!("{}Lambda\n", indent(depth)),
        };

        if !self.params.is_empty() {
            result += &format!("{}Params\n", indent(depth + 1));
            for param in &self.params {
                result += &param.render(depth + 2);
            }
        }

        result += &format!("{}Body\n", indent(depth + 1));
        result += &self.body.render(depth + 2);
        result
    }
}

/// Syntax Synopsis:
///
/// ``` ebnf
/// Import:
///     'import' Name ('.' Name)*
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Import {
    location: Location,
    /// The dotted name path, in source order.
    #[get = "pub"]
    names: Vec<Name>,
}

impl SourceElement for Import {
    fn location(&self) -> Location {
        self.location
    }
}

impl Render for Import {
    fn render(&self, depth: usize) -> String {
        format!(
            "{}Import {}\n",
            indent(depth),
            self.names.iter().map(Name::name).join(".")
        )
    }
}

impl Parser {
    /// Parses the body of a function or lambda, with `return` legal inside.
    fn parse_function_body(&mut self) -> Result<Statement, SyntaxError> {
        self.returnable += 1;
        let result = self.parse_statement();
        self.returnable -= 1;
        result
    }

    /// Parses the remainder of a lambda after the pointer operator, with the
    /// already-reinterpreted parameter names.
    pub(crate) fn parse_lambda(
        &mut self,
        location: Location,
        params: Vec<Name>,
    ) -> Result<Define, SyntaxError> {
        Ok(Define {
            location,
            name: None,
            params,
            body: Box::new(self.parse_function_body()?),
        })
    }

    /// Parses a [`Define`] declaration.
    pub(crate) fn parse_define(&mut self) -> Result<Define, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::Def)?;
        let name = self.parse_name()?;
        let mut params = Vec::new();

        self.expect_operator(OperatorKind::BracketLeft)?;

        if !self.is_operator(OperatorKind::BracketRight)? {
            loop {
                params.push(self.parse_name()?);

                if !self.skip_operator(OperatorKind::Comma)? {
                    break;
                }
            }
        }

        self.expect_operator(OperatorKind::BracketRight)?;

        Ok(Define {
            location: token.location(),
            name: Some(name),
            params,
            body: Box::new(self.parse_function_body()?),
        })
    }

    /// Parses an [`Import`] declaration.
    pub(crate) fn parse_import(&mut self) -> Result<Import, SyntaxError> {
        let token = self.expect_keyword(KeywordKind::Import)?;
        let mut names = Vec::new();

        loop {
            names.push(self.parse_name()?);

            if !self.skip_operator(OperatorKind::Point)? {
                break;
            }
        }

        Ok(Import {
            location: token.location(),
            names,
        })
    }
}
