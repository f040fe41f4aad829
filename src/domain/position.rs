//! Long-only position state for the execution simulator.
//!
//! The simulator is either all cash or all shares; there is no partial
//! allocation and no short side.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat { cash: f64 },
    Long { shares: f64 },
}

impl Position {
    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    pub fn cash(&self) -> f64 {
        match self {
            Position::Flat { cash } => *cash,
            Position::Long { .. } => 0.0,
        }
    }

    pub fn shares(&self) -> f64 {
        match self {
            Position::Flat { .. } => 0.0,
            Position::Long { shares } => *shares,
        }
    }

    /// Mark-to-market value: `cash + shares * price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.cash() + self.shares() * price
    }

    /// Spend all cash on shares at `price`, paying `commission_rate` of the
    /// cash up front. `None` when already long.
    pub fn buy(&self, price: f64, commission_rate: f64) -> Option<Position> {
        match self {
            Position::Flat { cash } => Some(Position::Long {
                shares: cash * (1.0 - commission_rate) / price,
            }),
            Position::Long { .. } => None,
        }
    }

    /// Sell every share at `price`, paying `commission_rate` of the proceeds.
    /// `None` when flat.
    pub fn sell(&self, price: f64, commission_rate: f64) -> Option<Position> {
        match self {
            Position::Long { shares } => Some(Position::Flat {
                cash: shares * price * (1.0 - commission_rate),
            }),
            Position::Flat { .. } => None,
        }
    }
}
