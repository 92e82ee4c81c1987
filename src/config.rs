/// Where `set!` writes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetScope {
    /// Always bind in the innermost scope of the current chain, shadowing any
    /// outer binding of the same name.
    #[default]
    Innermost,
    /// Rebind the nearest scope that already holds the name; unbound names
    /// are an error.
    Nearest,
}

/// How atoms that look numeric are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralRules {
    /// Integers, then floats that are not integer-valued. `2.0` ends up a
    /// symbol.
    #[default]
    Reference,
    /// Integers, then any finite float. `2.0` is a float.
    Numeric,
}

pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 1000;
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub set_scope: SetScope,
    pub literal_rules: LiteralRules,
    /// Closure applications allowed to nest before evaluation gives up.
    pub max_call_depth: usize,
    /// Nested `eval` calls of any kind allowed before evaluation gives up.
    pub max_eval_depth: usize,
    /// Deepest list nesting the parser accepts.
    pub max_parse_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            set_scope: SetScope::default(),
            literal_rules: LiteralRules::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
            max_parse_depth: DEFAULT_MAX_PARSE_DEPTH,
        }
    }
}

impl Config {
    pub fn with_set_scope(mut self, set_scope: SetScope) -> Self {
        self.set_scope = set_scope;
        self
    }

    pub fn with_literal_rules(mut self, literal_rules: LiteralRules) -> Self {
        self.literal_rules = literal_rules;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_max_eval_depth(mut self, max_eval_depth: usize) -> Self {
        self.max_eval_depth = max_eval_depth;
        self
    }

    pub fn with_max_parse_depth(mut self, max_parse_depth: usize) -> Self {
        self.max_parse_depth = max_parse_depth;
        self
    }
}
