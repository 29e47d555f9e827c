//! A registered producer's declared identity and supported providers,
//! builder-styled after the way SIGNIA plugin specs are assembled.

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProducerId(pub String);

impl ProducerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for ProducerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ProducerDescriptor {
    pub id: ProducerId,
    pub supported_providers: Vec<String>,
}

impl ProducerDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ProducerId::new(id),
            supported_providers: Vec::new(),
        }
    }

    pub fn support(mut self, provider: impl Into<String>) -> Self {
        self.supported_providers.push(provider.into());
        self
    }

    pub fn supports(&self, provider: &str) -> bool {
        self.supported_providers.is_empty() || self.supported_providers.iter().any(|p| p == provider)
    }
}
