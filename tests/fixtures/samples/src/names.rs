use refine::{Transformer, refined};

#[refined(String)]
pub struct FullName;

impl Transformer<String> for FullName {
    fn transform(value: String) -> String {
        value.trim().to_string()
    }
}
