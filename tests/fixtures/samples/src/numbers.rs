use refine::prelude::*;

#[refined(i32)]
pub struct X10;

impl Transformer<i32> for X10 {
    fn transform(value: i32) -> i32 {
        value * 10
    }
}

#[refined(i32, Default | ExplicitConversion)]
pub struct NonNegative;

impl Validator<i32> for NonNegative {
    fn validate(value: &i32) -> Result<(), RefineError> {
        if *value < 0 {
            Err(RefineError::invalid("value must be non-negative"))
        } else {
            Ok(())
        }
    }
}

#[refined(i32)]
pub struct StrictlyPositive;

impl FallibleValidator<i32> for StrictlyPositive {
    fn try_validate(value: &i32) -> bool {
        *value > 0
    }
}
