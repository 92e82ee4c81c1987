use risplet::{classify_literal, parse, Error, Expression, Interpreter, LiteralRules, RuntimeError, Value};

fn eval_last(interpreter: &Interpreter, text: &str) -> Result<Value, Error> {
    let mut values = interpreter.run(text)?;
    Ok(values.pop().unwrap_or(Value::Unspecified))
}

#[test]
fn integer_tokens_classify_as_ints() {
    for n in [-1_000_000_007i64, -42, -1, 0, 1, 7, 123_456_789, i64::MIN, i64::MAX] {
        assert_eq!(
            classify_literal(&n.to_string(), LiteralRules::Reference),
            Ok(Expression::Int(n))
        );
    }
}

#[test]
fn decimal_tokens_classify_as_floats() {
    for d in [0.5f64, -0.5, 2.5, 3.14159, -1234.125, 0.001, 1e-9] {
        let token = format!("{:?}", d);
        assert_eq!(classify_literal(&token, LiteralRules::Reference), Ok(Expression::Float(d)));
    }
}

#[test]
fn addition() -> Result<(), Error> {
    let forms = parse("(+ 1 2)")?;
    let interpreter = Interpreter::new();
    assert_eq!(interpreter.eval(&forms[0])?, Value::Int(3));
    Ok(())
}

#[test]
fn squaring_lambda() -> Result<(), Error> {
    assert_eq!(eval_last(&Interpreter::new(), "((lambda (x) (* x x)) 5)")?, Value::Int(25));
    Ok(())
}

#[test]
fn let_bindings_do_not_leak() -> Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(eval_last(&interpreter, "(let ((x 1)) (let ((x 2)) x))")?, Value::Int(2));
    assert_eq!(
        eval_last(&interpreter, "(let ((x 1)) (let ((y (let ((x 2)) x))) x))")?,
        Value::Int(1)
    );
    assert!(interpreter.environment().get("x").is_none());
    Ok(())
}

#[test]
fn define_then_call() -> Result<(), Error> {
    let interpreter = Interpreter::new();
    let forms = parse("(define (add1 x) (+ x 1)) (add1 41)")?;
    assert_eq!(forms.len(), 2);
    assert_eq!(interpreter.eval(&forms[0])?, Value::Unspecified);
    assert_eq!(interpreter.eval(&forms[1])?, Value::Int(42));
    Ok(())
}

#[test]
fn zero_is_truthy() -> Result<(), Error> {
    assert_eq!(eval_last(&Interpreter::new(), "(if 0 1 2)")?, Value::Int(1));
    Ok(())
}

#[test]
fn unbound_and_not_callable() -> Result<(), Error> {
    let interpreter = Interpreter::new();
    let forms = parse("(+ undefined 1)")?;
    assert_eq!(
        interpreter.eval(&forms[0]),
        Err(RuntimeError::UnboundVariable("undefined".to_string()))
    );

    interpreter.environment().define("undefined-fn", Value::Int(3));
    let forms = parse("(undefined-fn 1 2)")?;
    assert_eq!(
        interpreter.eval(&forms[0]),
        Err(RuntimeError::NotCallable("3".to_string()))
    );
    Ok(())
}

#[test]
fn literal_values_round_trip() -> Result<(), Error> {
    let interpreter = Interpreter::new();
    let values = [
        Value::Int(0),
        Value::Int(-17),
        Value::Int(i64::MAX),
        Value::Float(2.5),
        Value::Float(-0.125),
        Value::Float(1e-7),
        Value::Str("hello".to_string()),
        Value::Str(String::new()),
    ];
    for value in values {
        let text = format!("((lambda (v) v) {})", value);
        assert_eq!(eval_last(&interpreter, &text)?, value, "{}", text);
    }
    Ok(())
}

#[test]
fn closures_share_a_let_scope() -> Result<(), Error> {
    let interpreter = Interpreter::new();
    let text = "(define (make-adder n) (lambda (x) (+ x n))) \
                (let ((add5 (make-adder 5)) (add10 (make-adder 10))) (add5 (add10 1)))";
    assert_eq!(eval_last(&interpreter, text)?, Value::Int(16));
    Ok(())
}

#[test]
fn mixed_arithmetic() -> Result<(), Error> {
    let interpreter = Interpreter::new();
    assert_eq!(eval_last(&interpreter, "(+ 1 2.5)")?, Value::Float(3.5));
    assert_eq!(eval_last(&interpreter, "(- 10 2.5 0.5)")?, Value::Float(7.0));
    assert_eq!(eval_last(&interpreter, "(= 7.5 (+ 7 0.5))")?, Value::Bool(true));
    Ok(())
}
