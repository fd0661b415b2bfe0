//! Verification system for LLM-suggested optimizations.
//!
//! This module provides equivalence checking to ensure that LLM suggestions
//! preserve the semantics of the original code.

use crate::{LlmError, Result};
use crate::provider::{OptimizationSuggestion, VerificationHint, VerificationHintKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether verification succeeded
    pub verified: bool,

    /// Confidence in the verification (0.0 - 1.0)
    pub confidence: f64,

    /// Verification method used
    pub method: VerificationMethod,

    /// Time taken for verification
    pub duration: Duration,

    /// Counterexample if verification failed
    pub counterexample: Option<Counterexample>,

    /// Proof witness if available
    pub proof_witness: Option<ProofWitness>,

    /// Warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl VerificationResult {
    /// Create a successful verification result
    pub fn success(method: VerificationMethod, duration: Duration) -> Self {
        Self {
            verified: true,
            confidence: 1.0,
            method,
            duration,
            counterexample: None,
            proof_witness: None,
            warnings: vec![],
        }
    }

    /// Create a failed verification result
    pub fn failure(method: VerificationMethod, duration: Duration, counterexample: Counterexample) -> Self {
        Self {
            verified: false,
            confidence: 1.0,
            method,
            duration,
            counterexample: Some(counterexample),
            proof_witness: None,
            warnings: vec![],
        }
    }

    /// Create an inconclusive result
    pub fn inconclusive(method: VerificationMethod, duration: Duration, confidence: f64) -> Self {
        Self {
            verified: false,
            confidence,
            method,
            duration,
            counterexample: None,
            proof_witness: None,
            warnings: vec!["Verification was inconclusive".to_string()],
        }
    }
}

/// Method used for verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationMethod {
    /// Simple syntactic/structural comparison
    Syntactic,
    /// Testing with generated inputs
    Testing,
    /// Symbolic execution
    Symbolic,
    /// SMT solver based
    Smt,
    /// Proof assistant (Coq, Lean, etc.)
    ProofAssistant,
    /// Combination of methods
    Hybrid,
    /// Skipped verification
    Skipped,
}

/// Counterexample showing difference between original and optimized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterexample {
    /// Input values that cause different outputs
    pub inputs: Vec<CounterexampleValue>,
    /// Output from original code
    pub original_output: CounterexampleValue,
    /// Output from optimized code
    pub optimized_output: CounterexampleValue,
}

/// Value in a counterexample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CounterexampleValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Array(Vec<CounterexampleValue>),
    Struct(Vec<(String, CounterexampleValue)>),
    Null,
}

/// Proof witness for successful verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofWitness {
    /// Type of proof
    pub proof_type: ProofType,
    /// Serialized proof data
    pub data: String,
}

/// Type of proof witness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// Induction proof
    Induction,
    /// Case analysis
    CaseAnalysis,
    /// SMT proof certificate
    SmtCertificate,
    /// Test coverage proof
    TestCoverage,
}

/// Trait for equivalence checkers
pub trait EquivalenceChecker: Send + Sync {
    /// Check if two code snippets are semantically equivalent
    fn check_equivalence(
        &self,
        original: &str,
        optimized: &str,
        hints: &[VerificationHint],
    ) -> Result<VerificationResult>;

    /// Get the name of this checker
    fn name(&self) -> &str;

    /// Get supported verification methods
    fn supported_methods(&self) -> Vec<VerificationMethod>;
}

/// Main verifier that coordinates verification
pub struct Verifier {
    /// List of available checkers
    checkers: Vec<Box<dyn EquivalenceChecker>>,
    /// Timeout for verification
    timeout: Duration,
    /// Whether to require proof witness
    require_proof: bool,
}

impl Verifier {
    /// Create a new verifier with default checkers
    pub fn new() -> Self {
        Self {
            checkers: vec![
                Box::new(SyntacticChecker::new()),
                Box::new(TestingChecker::new()),
            ],
            timeout: Duration::from_secs(30),
            require_proof: false,
        }
    }

    /// Create a strict verifier that requires proof
    pub fn strict() -> Self {
        Self {
            checkers: vec![
                Box::new(SyntacticChecker::new()),
                Box::new(TestingChecker::new()),
                Box::new(SmtChecker::new()),
            ],
            timeout: Duration::from_secs(60),
            require_proof: true,
        }
    }

    /// Set the verification timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a custom checker
    pub fn with_checker(mut self, checker: Box<dyn EquivalenceChecker>) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Verify an optimization suggestion
    pub fn verify(
        &self,
        original: &str,
        suggestion: &OptimizationSuggestion,
    ) -> Result<VerificationResult> {
        let start = std::time::Instant::now();

        // Try each checker in order
        for checker in &self.checkers {
            match checker.check_equivalence(original, &suggestion.optimized_code, &suggestion.verification_hints) {
                Ok(result) if result.verified => {
                    return Ok(result);
                }
                Ok(result) if result.counterexample.is_some() => {
                    // Found a counterexample - verification failed
                    return Ok(result);
                }
                Ok(_) => {
                    // Inconclusive, try next checker
                    continue;
                }
                Err(e) => {
                    // Checker error, try next
                    eprintln!("Checker {} failed: {}", checker.name(), e);
                    continue;
                }
            }
        }

        // No checker could verify
        Ok(VerificationResult::inconclusive(
            VerificationMethod::Hybrid,
            start.elapsed(),
            0.0,
        ))
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple syntactic equivalence checker
pub struct SyntacticChecker;

impl SyntacticChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SyntacticChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl EquivalenceChecker for SyntacticChecker {
    fn check_equivalence(
        &self,
        original: &str,
        optimized: &str,
        hints: &[VerificationHint],
    ) -> Result<VerificationResult> {
        let start = std::time::Instant::now();

        // Check for trivial equivalence hint
        if hints.iter().any(|h| h.kind == VerificationHintKind::TrivialEquivalence) {
            return Ok(VerificationResult::success(
                VerificationMethod::Syntactic,
                start.elapsed(),
            ));
        }

        // Normalize whitespace and compare
        let normalized_original: String = original.split_whitespace().collect();
        let normalized_optimized: String = optimized.split_whitespace().collect();

        if normalized_original == normalized_optimized {
            return Ok(VerificationResult::success(
                VerificationMethod::Syntactic,
                start.elapsed(),
            ));
        }

        // Syntactic check is inconclusive for different code
        Ok(VerificationResult::inconclusive(
            VerificationMethod::Syntactic,
            start.elapsed(),
            0.0,
        ))
    }

    fn name(&self) -> &str {
        "syntactic"
    }

    fn supported_methods(&self) -> Vec<VerificationMethod> {
        vec![VerificationMethod::Syntactic]
    }
}

/// Testing-based equivalence checker
pub struct TestingChecker {
    /// Number of test cases to generate
    num_tests: usize,
}

impl TestingChecker {
    pub fn new() -> Self {
        Self { num_tests: 100 }
    }

    pub fn with_tests(mut self, num_tests: usize) -> Self {
        self.num_tests = num_tests;
        self
    }
}

impl Default for TestingChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl EquivalenceChecker for TestingChecker {
    fn check_equivalence(
        &self,
        original: &str,
        optimized: &str,
        _hints: &[VerificationHint],
    ) -> Result<VerificationResult> {
        let start = std::time::Instant::now();

        // TODO: Actually run the code with generated inputs
        // For now, return inconclusive
        Ok(VerificationResult::inconclusive(
            VerificationMethod::Testing,
            start.elapsed(),
            0.5, // Medium confidence from testing
        ))
    }

    fn name(&self) -> &str {
        "testing"
    }

    fn supported_methods(&self) -> Vec<VerificationMethod> {
        vec![VerificationMethod::Testing]
    }
}

/// SMT-based equivalence checker (placeholder)
pub struct SmtChecker;

impl SmtChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SmtChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl EquivalenceChecker for SmtChecker {
    fn check_equivalence(
        &self,
        _original: &str,
        _optimized: &str,
        _hints: &[VerificationHint],
    ) -> Result<VerificationResult> {
        let start = std::time::Instant::now();

        // TODO: Implement SMT-based verification using Z3 or similar
        Ok(VerificationResult::inconclusive(
            VerificationMethod::Smt,
            start.elapsed(),
            0.0,
        ))
    }

    fn name(&self) -> &str {
        "smt"
    }

    fn supported_methods(&self) -> Vec<VerificationMethod> {
        vec![VerificationMethod::Smt]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntactic_checker_identical() {
        let checker = SyntacticChecker::new();
        let result = checker.check_equivalence("fn foo() end", "fn foo() end", &[]).unwrap();
        assert!(result.verified);
    }

    #[test]
    fn test_syntactic_checker_whitespace() {
        let checker = SyntacticChecker::new();
        let result = checker.check_equivalence("fn foo() end", "fn  foo()  end", &[]).unwrap();
        assert!(result.verified);
    }

    #[test]
    fn test_syntactic_checker_different() {
        let checker = SyntacticChecker::new();
        let result = checker.check_equivalence("fn foo() end", "fn bar() end", &[]).unwrap();
        assert!(!result.verified);
        assert!(result.confidence < 1.0); // Inconclusive
    }

    #[test]
    fn test_verifier_trivial_hint() {
        let checker = SyntacticChecker::new();
        let hint = VerificationHint {
            kind: VerificationHintKind::TrivialEquivalence,
            data: None,
        };
        let result = checker.check_equivalence("foo", "bar", &[hint]).unwrap();
        assert!(result.verified);
    }
}
