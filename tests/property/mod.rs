//! Property-based tests for batch accounting
