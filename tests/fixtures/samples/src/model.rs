use refine::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

/// A person with a non-empty name and a plausible age.
#[refined(Person)]
pub struct ValidatedPerson;

impl Validator<Person> for ValidatedPerson {
    fn validate(value: &Person) -> Result<(), RefineError> {
        RefineError::fields([
            ("name", value.name.trim().is_empty().then_some("must not be empty")),
            ("age", (value.age > 150).then_some("is not plausible")),
        ])
    }
}
