use refine::refined;

#[refined((i32, i32), Equals | Equatable | ComparisonOperators)]
pub struct BasketballScore;
