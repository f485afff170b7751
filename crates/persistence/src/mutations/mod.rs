// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! All writes go through Diesel DSL. The booking update and its history
//! append always share one immediate transaction.

pub mod bookings;

pub use bookings::{compare_and_swap, insert_booking};
