//! Textual parameter substitution.
//!
//! `$(name)` expands to the parameter value, `$$` escapes a dollar, any
//! other `$` is literal. Substitution is a single left-to-right pass over
//! every scalar of the tree; mapping keys are never substituted. Undefined
//! names are collected in encounter order and expand to nothing.

use indexmap::IndexMap;

use crate::preproc::node::Node;

/// Substitute parameters in every scalar of the tree.
pub fn substitute_node(
    node: &mut Node,
    params: &IndexMap<String, String>,
    undefined: &mut Vec<String>,
) {
    match node {
        Node::Mapping(entries) => {
            for (_, value) in entries.iter_mut() {
                substitute_node(value, params, undefined);
            }
        }
        Node::Sequence(items) => {
            for item in items.iter_mut() {
                substitute_node(item, params, undefined);
            }
        }
        Node::Scalar(scalar) => {
            scalar.value = substitute(&scalar.value, params, undefined);
        }
        Node::Null => {}
    }
}

/// Substitute parameters in a single string.
pub fn substitute(
    input: &str,
    params: &IndexMap<String, String>,
    undefined: &mut Vec<String>,
) -> String {
    enum State {
        None,
        ParamBegin,
        Param(usize),
    }

    let mut state = State::None;
    let mut result = String::with_capacity(input.len());

    let chars: Vec<char> = input.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let is_last = i + 1 == chars.len();

        match state {
            State::None => {
                if c == '$' && !is_last {
                    state = State::ParamBegin;
                } else {
                    result.push(c);
                }
            }
            State::ParamBegin => {
                if c == '(' {
                    state = State::Param(i + 1);
                } else if c == '$' {
                    state = State::None;
                    result.push(c);
                } else {
                    state = State::None;
                    result.push('$');
                    result.push(c);
                }
            }
            State::Param(start) => {
                if c == ')' {
                    let name: String = chars[start..i].iter().collect();
                    match params.get(&name) {
                        Some(value) => result.push_str(value),
                        None => undefined.push(name),
                    }
                    state = State::None;
                }
            }
        }
    }

    // an unterminated parameter is emitted literally
    match state {
        State::ParamBegin => result.push('$'),
        State::Param(start) => {
            result.push_str("$(");
            result.extend(&chars[start..]);
        }
        State::None => {}
    }

    result
}
