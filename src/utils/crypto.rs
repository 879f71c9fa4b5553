use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};
use crate::services::quiz_engine::QuizResults;

type HmacSha256 = Hmac<Sha256>;

/// Canonical query string carried to the results screen. The parameter
/// order is fixed so the signature can be recomputed from the same values.
pub fn results_query(results: &QuizResults) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("score", &results.score.to_string())
        .append_pair("totalQuestions", &results.total_questions.to_string())
        .append_pair("timeSeconds", &results.elapsed_seconds.to_string())
        .append_pair("bonusLives", &results.bonus_lives.to_string())
        .finish()
}

pub fn sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Internal(format!("signing key rejected: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify(secret: &str, payload: &str, signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> QuizResults {
        QuizResults {
            score: 4,
            total_questions: 4,
            elapsed_seconds: 95,
            bonus_lives: 1,
            bonus_points: 0,
        }
    }

    #[test]
    fn query_keeps_parameter_order() {
        assert_eq!(
            results_query(&results()),
            "score=4&totalQuestions=4&timeSeconds=95&bonusLives=1"
        );
    }

    #[test]
    fn signature_verifies_only_untampered_payloads() {
        let query = results_query(&results());
        let sig = sign("s3cret", &query).unwrap();
        assert!(verify("s3cret", &query, &sig));
        assert!(!verify("other", &query, &sig));
        assert!(!verify("s3cret", &query.replace("score=4", "score=5"), &sig));
        assert!(!verify("s3cret", &query, "not-hex"));
    }
}
