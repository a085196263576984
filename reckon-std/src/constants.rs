//! Mathematical constants

use reckon_plugin::ConstantDef;

pub fn pi() -> ConstantDef {
    ConstantDef::new("pi", std::f64::consts::PI, "math", "Ratio of a circle's circumference to its diameter")
}

pub fn e() -> ConstantDef {
    ConstantDef::new("e", std::f64::consts::E, "math", "Base of the natural logarithm")
}
