//! Rule string tokenizer and tree builder

use smallvec::SmallVec;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::rule::ast::{Connective, OperatorNode, RuleNode};

/// Lexical token of a rule string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    OpenParen,
    CloseParen,
    Connective(Connective),
    Word(&'a str),
}

/// Split a rule string into tokens.
///
/// Parentheses are always tokens of their own; everything else is split on
/// whitespace runs. No token is ever empty.
pub fn tokenize(rule: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    for chunk in rule.split_whitespace() {
        let mut rest = chunk;
        while let Some(pos) = rest.find(['(', ')']) {
            if pos > 0 {
                tokens.push(word(&rest[..pos]));
            }
            tokens.push(if rest.as_bytes()[pos] == b'(' {
                Token::OpenParen
            } else {
                Token::CloseParen
            });
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            tokens.push(word(rest));
        }
    }

    tokens
}

fn word(text: &str) -> Token<'_> {
    match Connective::from_keyword(text) {
        Some(connective) => Token::Connective(connective),
        None => Token::Word(text),
    }
}

/// Parse a rule string into a tree; `None` when nothing could be built
pub fn build(rule: &str, sink: &dyn DiagnosticSink) -> Option<RuleNode> {
    let root = Builder::new(sink).run(&tokenize(rule));
    if root.is_none() {
        sink.report(Diagnostic::EmptyRule {
            rule: rule.to_string(),
        });
    }
    root
}

/// Shift/reduce pass over the token stream.
///
/// Left-associative, no precedence between AND and OR; parentheses are the
/// only grouping.
struct Builder<'s, 'a> {
    sink: &'s dyn DiagnosticSink,
    current: Option<RuleNode>,
    stack: Vec<Option<RuleNode>>,
    operand: SmallVec<[&'a str; 4]>,
}

impl<'s, 'a> Builder<'s, 'a> {
    fn new(sink: &'s dyn DiagnosticSink) -> Self {
        Self {
            sink,
            current: None,
            stack: Vec::new(),
            operand: SmallVec::new(),
        }
    }

    fn run(mut self, tokens: &[Token<'a>]) -> Option<RuleNode> {
        for token in tokens {
            match *token {
                Token::OpenParen => {
                    self.stack.push(self.current.take());
                }
                Token::CloseParen => {
                    self.close_operand();
                    self.close_group();
                }
                Token::Connective(connective) => {
                    self.flush_before_connective();
                    let mut node = OperatorNode::new(connective);
                    node.left = self.current.take().map(Box::new);
                    self.current = Some(RuleNode::Operator(node));
                }
                Token::Word(word) => self.operand.push(word),
            }
        }

        self.close_operand();

        if !self.stack.is_empty() {
            self.sink.report(Diagnostic::UnclosedGroup {
                depth: self.stack.len(),
            });
        }

        self.current
    }

    fn take_operand(&mut self) -> Option<RuleNode> {
        if self.operand.is_empty() {
            return None;
        }
        let text = self.operand.join(" ");
        self.operand.clear();
        Some(RuleNode::operand(text))
    }

    /// Flush at `)` or end of input: complete the current operator's right
    /// side, or become the current node outright.
    fn close_operand(&mut self) {
        let Some(operand) = self.take_operand() else {
            return;
        };
        match &mut self.current {
            Some(RuleNode::Operator(op)) => op.right = Some(Box::new(operand)),
            _ => self.current = Some(operand),
        }
    }

    /// Flush at AND/OR: the operand only survives as the right child of an
    /// operator already in the register.
    fn flush_before_connective(&mut self) {
        let Some(operand) = self.take_operand() else {
            return;
        };
        match &mut self.current {
            Some(RuleNode::Operator(op)) => op.right = Some(Box::new(operand)),
            _ => self.sink.report(Diagnostic::DroppedOperand {
                operand: operand.value().to_string(),
            }),
        }
    }

    fn close_group(&mut self) {
        let Some(saved) = self.stack.pop() else {
            self.sink.report(Diagnostic::UnbalancedClose);
            return;
        };
        if let Some(RuleNode::Operator(mut parent)) = saved {
            if let Some(inner) = self.current.take() {
                parent.right = Some(Box::new(inner));
                self.current = Some(RuleNode::Operator(parent));
            }
        }
    }
}
