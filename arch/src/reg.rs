use num_enum::IntoPrimitive;
use strum::{Display, EnumString};

/// SIC/XE register file. The discriminant is the 4-bit code placed in
/// format-2 operand fields (there is no register 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, IntoPrimitive)]
#[repr(u8)]
pub enum Reg {
    A = 0,
    X = 1,
    L = 2,
    B = 3,
    S = 4,
    T = 5,
    F = 6,
    PC = 8,
    SW = 9,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_uppercase().parse::<Self>() {
            Ok(r) => Ok(r),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn nibble(self) -> u8 {
        self.into()
    }
}

#[test]
fn test() {
    println!("{}", Reg::A);
    println!("{:?}", Reg::parse("pc"));
    println!("{:?}", Reg::parse("hoge"));
    assert_eq!(Reg::parse("x").unwrap(), Reg::X);
    assert_eq!(Reg::PC.nibble(), 8);
    assert_eq!(Reg::SW.nibble(), 9);
    assert!(Reg::parse("Q").is_err());
}
