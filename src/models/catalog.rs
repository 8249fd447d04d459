use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IceCreamLine {
    Pro,
    Promax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IceCreamSize {
    #[serde(rename = "80g")]
    G80,
    #[serde(rename = "500ml")]
    Ml500,
    #[serde(rename = "2700ml")]
    Ml2700,
    #[serde(rename = "3500ml")]
    Ml3500,
}

impl IceCreamLine {
    pub const ALL: [IceCreamLine; 2] = [IceCreamLine::Pro, IceCreamLine::Promax];

    pub fn as_str(self) -> &'static str {
        match self {
            IceCreamLine::Pro => "Pro",
            IceCreamLine::Promax => "Promax",
        }
    }
}

impl IceCreamSize {
    pub const ALL: [IceCreamSize; 4] = [
        IceCreamSize::G80,
        IceCreamSize::Ml500,
        IceCreamSize::Ml2700,
        IceCreamSize::Ml3500,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IceCreamSize::G80 => "80g",
            IceCreamSize::Ml500 => "500ml",
            IceCreamSize::Ml2700 => "2700ml",
            IceCreamSize::Ml3500 => "3500ml",
        }
    }
}

// List prices in VND per box.
pub fn list_price(line: IceCreamLine, size: IceCreamSize) -> f64 {
    match (line, size) {
        (IceCreamLine::Pro, IceCreamSize::G80) => 12_000.0,
        (IceCreamLine::Pro, IceCreamSize::Ml500) => 55_000.0,
        (IceCreamLine::Pro, IceCreamSize::Ml2700) => 250_000.0,
        (IceCreamLine::Pro, IceCreamSize::Ml3500) => 310_000.0,
        (IceCreamLine::Promax, IceCreamSize::G80) => 15_000.0,
        (IceCreamLine::Promax, IceCreamSize::Ml500) => 65_000.0,
        (IceCreamLine::Promax, IceCreamSize::Ml2700) => 290_000.0,
        (IceCreamLine::Promax, IceCreamSize::Ml3500) => 360_000.0,
    }
}
