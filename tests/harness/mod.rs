// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for contact form abuse simulation.
//!
//! Utilities for driving scripted submission patterns through the intake
//! pipeline and measuring how they are handled.

pub mod attacks;
pub mod generators;
pub mod metrics;
