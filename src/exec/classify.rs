use super::*;

/// Status the runner uses when the script hit its own execution ceiling.
pub const TIMEOUT_STATUS: u16 = 408;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,

    #[serde(default)]
    output: String,
}

pub fn classify_reply(reply: Result<HttpReply, TransportError>) -> Outcome {
    let reply = match reply {
        Ok(reply) => reply,
        Err(err) if err.timed_out => return Outcome::failed(DeskError::Timeout(err.message)),
        Err(err) => return Outcome::failed(DeskError::Network(err.message)),
    };

    if reply.status == TIMEOUT_STATUS {
        // Output is suppressed on a backend timeout, whatever the body says.
        let message = serde_json::from_str::<ErrorBody>(&reply.body)
            .map(|b| b.error)
            .unwrap_or_else(|_| "script execution exceeded the backend limit".to_string());
        return Outcome::failed(DeskError::Timeout(message));
    }

    if (200..300).contains(&reply.status) {
        return match serde_json::from_str::<RunCodeResponse>(&reply.body) {
            Ok(body) => Outcome {
                status: ExecStatus::Succeeded,
                output: body.output,
                error: body.error.filter(|e| !e.is_empty()),
                failure: None,
            },
            Err(err) => {
                Outcome::failed(DeskError::Network(format!("parse run-code response: {}", err)))
            }
        };
    }

    match serde_json::from_str::<ErrorBody>(&reply.body) {
        Ok(body) => Outcome {
            status: ExecStatus::Failed,
            output: body.output,
            error: None,
            failure: Some(DeskError::Backend(body.error)),
        },
        Err(_) => Outcome::failed(DeskError::Network(format!(
            "run-code returned status {} with an unreadable body",
            reply.status
        ))),
    }
}

#[cfg(test)]
#[path = "../tests/exec/classify_tests.rs"]
mod tests;
