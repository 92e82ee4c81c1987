use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use super::builtins::load_builtins;
use super::{parse_with, Closure, Config, Environment, Error, Expression, RuntimeError, SetScope, SyntaxError, Value};

type Result<T> = std::result::Result<T, RuntimeError>;

/// Owns the root environment (primitives plus every top-level `define`) and
/// evaluates expressions against it.
pub struct Interpreter {
    environment: Environment,
    config: Config,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let environment = Environment::new();
        load_builtins(&environment);
        Self { environment, config }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses with this interpreter's literal rules.
    pub fn parse(&self, text: &str) -> std::result::Result<Vec<Expression>, SyntaxError> {
        parse_with(text, &self.config)
    }

    pub fn eval(&self, exp: &Expression) -> Result<Value> {
        trace!("eval {}", exp);
        self.eval_in(exp, &self.environment)
    }

    pub fn eval_in(&self, exp: &Expression, env: &Environment) -> Result<Value> {
        Evaluation {
            config: &self.config,
            call_depth: 0,
            eval_depth: 0,
        }
        .eval(exp, env)
    }

    /// Parses `text` and evaluates each top-level form in order, stopping at
    /// the first error. Forms evaluated before the error keep their effects.
    pub fn run(&self, text: &str) -> std::result::Result<Vec<Value>, Error> {
        let mut values = vec![];
        for exp in self.parse(text)? {
            values.push(self.eval(&exp)?);
        }
        Ok(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpecialForm {
    If,
    Lambda,
    Let,
    Set,
    Define,
}

impl SpecialForm {
    fn from_head(head: Option<&Expression>) -> Option<SpecialForm> {
        match head.and_then(Expression::as_symbol)? {
            "if" => Some(SpecialForm::If),
            "lambda" => Some(SpecialForm::Lambda),
            "let" => Some(SpecialForm::Let),
            "set!" => Some(SpecialForm::Set),
            "define" => Some(SpecialForm::Define),
            _ => None,
        }
    }
}

// One top-level evaluation; tracks how deeply closure calls and `eval`
// calls are nested.
struct Evaluation<'a> {
    config: &'a Config,
    call_depth: usize,
    eval_depth: usize,
}

impl Evaluation<'_> {
    fn eval(&mut self, exp: &Expression, env: &Environment) -> Result<Value> {
        if self.eval_depth >= self.config.max_eval_depth {
            return Err(RuntimeError::EvalDepthExceeded(self.config.max_eval_depth));
        }

        self.eval_depth += 1;
        let result = self.eval_form(exp, env);
        self.eval_depth -= 1;
        result
    }

    fn eval_form(&mut self, exp: &Expression, env: &Environment) -> Result<Value> {
        let items = match exp {
            Expression::Int(i) => return Ok(Value::Int(*i)),
            Expression::Float(f) => return Ok(Value::Float(*f)),
            Expression::Str(s) => return Ok(Value::Str(s.clone())),
            Expression::Symbol(name) => {
                return env
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnboundVariable(name.clone()))
            }
            Expression::List(items) => items,
        };

        match SpecialForm::from_head(items.first()) {
            Some(SpecialForm::If) => self.eval_if(&items[1..], env),
            Some(SpecialForm::Lambda) => eval_lambda(&items[1..], env),
            Some(SpecialForm::Let) => self.eval_let(&items[1..], env),
            Some(SpecialForm::Set) => self.eval_set(&items[1..], env),
            Some(SpecialForm::Define) => eval_define(&items[1..], env),
            None => self.eval_application(items, env),
        }
    }

    // (if predicate consequent alternative)
    fn eval_if(&mut self, args: &[Expression], env: &Environment) -> Result<Value> {
        let [predicate, consequent, alternative] = args else {
            return Err(RuntimeError::malformed("if", "expected a predicate, a consequent and an alternative"));
        };

        if self.eval(predicate, env)?.is_truthy() {
            self.eval(consequent, env)
        } else {
            self.eval(alternative, env)
        }
    }

    // (let ((name expr) ...) body)
    fn eval_let(&mut self, args: &[Expression], env: &Environment) -> Result<Value> {
        let [bindings, body] = args else {
            return Err(RuntimeError::malformed("let", "expected a binding list and a single body"));
        };
        let bindings = bindings
            .as_list()
            .ok_or(RuntimeError::malformed("let", "bindings must be a list"))?;

        // every initializer sees the outer environment only
        let mut scope = HashMap::with_capacity(bindings.len());
        for binding in bindings {
            let (name, init) = match binding.as_list() {
                Some([Expression::Symbol(name), init]) => (name, init),
                _ => return Err(RuntimeError::malformed("let", "each binding must be (name expr)")),
            };
            scope.insert(name.clone(), self.eval(init, env)?);
        }

        self.eval(body, &env.extend(scope))
    }

    // (set! name expr)
    fn eval_set(&mut self, args: &[Expression], env: &Environment) -> Result<Value> {
        let [Expression::Symbol(name), exp] = args else {
            return Err(RuntimeError::malformed("set!", "expected a symbol and an expression"));
        };

        let value = self.eval(exp, env)?;
        debug!("set! {} = {}", name, value);
        match self.config.set_scope {
            SetScope::Innermost => env.define(name.as_str(), value),
            SetScope::Nearest => env.assign(name, value)?,
        }
        Ok(Value::Unspecified)
    }

    fn eval_application(&mut self, items: &[Expression], env: &Environment) -> Result<Value> {
        let values = items
            .iter()
            .map(|item| self.eval(item, env))
            .collect::<Result<Vec<_>>>()?;

        match values.split_first() {
            Some((callee, args)) => self.apply(callee, args),
            None => Err(RuntimeError::malformed("()", "cannot apply an empty list")),
        }
    }

    fn apply(&mut self, callee: &Value, args: &[Value]) -> Result<Value> {
        match callee {
            Value::Closure(closure) => {
                if closure.params.len() != args.len() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: closure.params.len(),
                        found: args.len(),
                    });
                }
                if self.call_depth >= self.config.max_call_depth {
                    return Err(RuntimeError::CallDepthExceeded(self.config.max_call_depth));
                }

                trace!("apply {} to {} argument(s)", callee, args.len());
                let bindings = closure.params.iter().cloned().zip(args.iter().cloned()).collect();
                let call_env = closure.env.extend(bindings);

                self.call_depth += 1;
                let result = self.eval(&closure.body, &call_env);
                self.call_depth -= 1;
                result
            },
            Value::Primitive(primitive) => (primitive.func)(args),
            Value::Unspecified => Err(RuntimeError::NotCallable(callee.type_name().to_string())),
            other => Err(RuntimeError::NotCallable(other.to_string())),
        }
    }
}

// (lambda (param ...) body)
fn eval_lambda(args: &[Expression], env: &Environment) -> Result<Value> {
    let [params, body] = args else {
        return Err(RuntimeError::malformed("lambda", "expected a parameter list and a single body"));
    };
    let params = params
        .as_list()
        .ok_or(RuntimeError::malformed("lambda", "parameters must be a list"))?;

    make_closure("lambda", params, body, env)
}

// (define (name param ...) body)
fn eval_define(args: &[Expression], env: &Environment) -> Result<Value> {
    let [signature, body] = args else {
        return Err(RuntimeError::malformed("define", "expected a signature and a single body"));
    };
    let (name, params) = match signature.as_list() {
        Some([Expression::Symbol(name), params @ ..]) => (name, params),
        Some(_) => return Err(RuntimeError::malformed("define", "function name must be a symbol")),
        None => return Err(RuntimeError::malformed("define", "only (define (name params...) body) is supported")),
    };

    let closure = make_closure("define", params, body, env)?;
    debug!("define {}", name);
    env.define(name.as_str(), closure);
    Ok(Value::Unspecified)
}

fn make_closure(form: &'static str, params: &[Expression], body: &Expression, env: &Environment) -> Result<Value> {
    let params = params
        .iter()
        .map(|param| {
            param
                .as_symbol()
                .map(str::to_string)
                .ok_or(RuntimeError::malformed(form, "parameter names must be symbols"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Value::Closure(Rc::new(Closure {
        params,
        body: body.clone(),
        env: env.clone(),
    })))
}

#[cfg(test)]
fn run_last(interpreter: &Interpreter, text: &str) -> std::result::Result<Value, Error> {
    let mut values = interpreter.run(text)?;
    Ok(values.pop().unwrap_or(Value::Unspecified))
}

#[test]
fn literals_evaluate_to_themselves() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    let forms = interpreter.parse("(1 2.5 \"hi\")")?;
    let items = forms[0].as_list().unwrap_or_default();
    assert_eq!(interpreter.eval(&items[0])?, Value::Int(1));
    assert_eq!(interpreter.eval(&items[1])?, Value::Float(2.5));
    assert_eq!(interpreter.eval(&items[2])?, Value::Str("hi".to_string()));
    Ok(())
}

#[test]
fn if_only_false_is_falsy() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(run_last(&interpreter, "(if 0 1 2)")?, Value::Int(1));
    assert_eq!(run_last(&interpreter, "(if \"\" 1 2)")?, Value::Int(1));
    assert_eq!(run_last(&interpreter, "(if (= 1 2) 1 2)")?, Value::Int(2));
    assert_eq!(run_last(&interpreter, "(if (= 1 1) 1 2)")?, Value::Int(1));
    Ok(())
}

#[test]
fn if_evaluates_one_branch() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(run_last(&interpreter, "(if 0 1 (missing))")?, Value::Int(1));
    assert_eq!(run_last(&interpreter, "(if (= 0 1) (missing) 2)")?, Value::Int(2));
    Ok(())
}

#[test]
fn lambda_application() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(run_last(&interpreter, "((lambda (x) (* x x)) 5)")?, Value::Int(25));
    assert_eq!(run_last(&interpreter, "((lambda () 7))")?, Value::Int(7));
    assert_eq!(
        run_last(&interpreter, "(((lambda (x) (lambda (y) (- x y))) 10) 3)")?,
        Value::Int(7)
    );
    Ok(())
}

#[test]
fn let_is_not_recursive() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(run_last(&interpreter, "(let ((x 1)) (let ((x 2)) x))")?, Value::Int(2));
    assert_eq!(
        run_last(&interpreter, "(let ((x 1)) (let ((x 2) (y x)) y))")?,
        Value::Int(1)
    );
    assert_eq!(
        interpreter.run("(let ((x 1)) x) (+ x 1)"),
        Err(Error::Runtime(RuntimeError::UnboundVariable("x".to_string())))
    );
    Ok(())
}

#[test]
fn define_persists_across_forms() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    let values = interpreter.run("(define (add1 x) (+ x 1)) (add1 41)")?;
    assert_eq!(values, vec![Value::Unspecified, Value::Int(42)]);
    assert_eq!(run_last(&interpreter, "(add1 1)")?, Value::Int(2));
    Ok(())
}

#[test]
fn recursion_through_the_global_scope() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    let fact = "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 10)";
    assert_eq!(run_last(&interpreter, fact)?, Value::Int(3628800));
    Ok(())
}

#[test]
fn closures_see_later_definitions() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    let text = "(define (get-x) x) (set! x 10) (get-x)";
    assert_eq!(run_last(&interpreter, text)?, Value::Int(10));
    assert_eq!(run_last(&interpreter, "(set! x 11) (get-x)")?, Value::Int(11));
    Ok(())
}

#[test]
fn set_writes_innermost_scope() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    let text = "(set! n 1) (define (bump) (set! n 5)) (bump) (+ n 0)";
    assert_eq!(run_last(&interpreter, text)?, Value::Int(1));
    assert_eq!(interpreter.environment().get("n"), Some(Value::Int(1)));
    assert_eq!(run_last(&interpreter, "(set! fresh 3) (+ fresh 0)")?, Value::Int(3));

    // inside a call the write lands in the call's own scope
    let text = "(define (shadow x) (let ((ignored (set! n x))) (+ n 0))) (shadow 9)";
    assert_eq!(run_last(&interpreter, text)?, Value::Int(9));
    assert_eq!(interpreter.environment().get("n"), Some(Value::Int(1)));
    Ok(())
}

#[test]
fn set_nearest_rebinds_outer_scope() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::with_config(Config::default().with_set_scope(SetScope::Nearest));
    assert_eq!(interpreter.config().set_scope, SetScope::Nearest);
    let text = "(define (n) 0) (define (bump) (set! n 5)) (bump) (+ n 0)";
    assert_eq!(run_last(&interpreter, text)?, Value::Int(5));
    assert_eq!(interpreter.environment().get("n"), Some(Value::Int(5)));
    assert_eq!(
        interpreter.run("(set! fresh 3)"),
        Err(Error::Runtime(RuntimeError::UnboundVariable("fresh".to_string())))
    );
    Ok(())
}

#[test]
fn numeric_literal_rules() -> std::result::Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(
        interpreter.run("(+ 2.0 1)"),
        Err(Error::Runtime(RuntimeError::UnboundVariable("2.0".to_string())))
    );

    let numeric = Config::default().with_literal_rules(crate::LiteralRules::Numeric);
    let interpreter = Interpreter::with_config(numeric);
    assert_eq!(run_last(&interpreter, "(+ 2.0 1)")?, Value::Float(3.0));
    Ok(())
}

#[test]
fn runtime_errors() {
    let interpreter = Interpreter::new();
    let runtime = |text: &str| match interpreter.run(text) {
        Err(Error::Runtime(e)) => e,
        other => panic!("expected a runtime error, got {:?}", other),
    };

    assert_eq!(runtime("(+ y 1)"), RuntimeError::UnboundVariable("y".to_string()));
    assert_eq!(
        runtime("((lambda (x y) x) 1)"),
        RuntimeError::ArityMismatch { expected: 2, found: 1 }
    );
    assert_eq!(runtime("(set! not-fn 3) (not-fn 1 2)"), RuntimeError::NotCallable("3".to_string()));
    assert_eq!(
        runtime("((set! z 1))"),
        RuntimeError::NotCallable("unspecified".to_string())
    );
    assert!(matches!(runtime("(if 1 2)"), RuntimeError::MalformedForm { form: "if", .. }));
    assert!(matches!(runtime("(define x 5)"), RuntimeError::MalformedForm { form: "define", .. }));
    assert!(matches!(runtime("(lambda x x)"), RuntimeError::MalformedForm { form: "lambda", .. }));
    assert!(matches!(runtime("(lambda (1) 1)"), RuntimeError::MalformedForm { form: "lambda", .. }));
    assert!(matches!(runtime("(let (x 1) x)"), RuntimeError::MalformedForm { form: "let", .. }));
    assert!(matches!(runtime("(set! 1 2)"), RuntimeError::MalformedForm { form: "set!", .. }));
    assert!(matches!(runtime("(define (f) 1 2)"), RuntimeError::MalformedForm { form: "define", .. }));
    assert!(matches!(runtime("()"), RuntimeError::MalformedForm { form: "()", .. }));
}

#[test]
fn call_depth_is_bounded() {
    let interpreter = Interpreter::with_config(Config::default().with_max_call_depth(50));
    assert_eq!(
        interpreter.run("(define (spin n) (spin n)) (spin 0)"),
        Err(Error::Runtime(RuntimeError::CallDepthExceeded(50)))
    );
    assert_eq!(run_last(&interpreter, "((lambda (x) x) 1)"), Ok(Value::Int(1)));
}

#[cfg(test)]
fn nested_sum(depth: usize) -> String {
    format!("{}1{}", "(+ 1 ".repeat(depth), ")".repeat(depth))
}

#[test]
fn eval_depth_is_bounded() {
    let interpreter = Interpreter::with_config(Config::default().with_max_eval_depth(100));
    assert_eq!(run_last(&interpreter, &nested_sum(40)), Ok(Value::Int(41)));
    assert_eq!(
        interpreter.run(&nested_sum(150)),
        Err(Error::Runtime(RuntimeError::EvalDepthExceeded(100)))
    );
    assert_eq!(run_last(&interpreter, "(+ 1 2)"), Ok(Value::Int(3)));
}

#[test]
fn error_messages() {
    use insta::assert_snapshot;

    let interpreter = Interpreter::new();
    let message = |text: &str| interpreter.run(text).unwrap_err().to_string();

    assert_snapshot!(message("(f 1)"), @"runtime error: unbound variable `f`");
    assert_snapshot!(message("((lambda (a) a))"), @"runtime error: expected 1 argument(s) but got 0");
    assert_snapshot!(message("(1 2)"), @"runtime error: `1` is not callable");
    assert_snapshot!(message("(+ \"a\" 1)"), @r#"runtime error: `+` expects numbers but got `"a"`"#);
    assert_snapshot!(message("(if)"), @"runtime error: malformed `if`: expected a predicate, a consequent and an alternative");
    assert_snapshot!(message("(+ 1"), @"syntax error: expected ')' before end of input at 1:1");
}
