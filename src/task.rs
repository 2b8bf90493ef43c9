#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InjectionTask {
    pub domain: String,
    pub parameter: String,
    pub payload: String,
}

impl InjectionTask {
    /// `domain?parameter=payload`, concatenated as-is. Payloads are not URL-encoded.
    pub fn url(&self) -> String {
        format!("{}?{}={}", self.domain, self.parameter, self.payload)
    }
}

pub fn generate(domain: &str, parameters: &[String], payloads: &[String]) -> Vec<InjectionTask> {
    parameters
        .iter()
        .flat_map(|parameter| {
            payloads.iter().map(move |payload| InjectionTask {
                domain: domain.to_string(),
                parameter: parameter.clone(),
                payload: payload.clone(),
            })
        })
        .collect()
}
