//! Registry of remote endpoints.
//!
//! An [`Endpoints`] value knows the transport and, per contract, where that
//! contract is served. It builds typed clients on demand and can register
//! them in a [`Container`] so that implementations resolve the clients of
//! the services they call.
//!
//! ```rust,ignore
//! let endpoints = Endpoints::new(Arc::new(ReqwestTransport::new()))
//!     .with_endpoint::<CatalogClient>(EndpointOptions::new("http://localhost:5001"))
//!     .with_endpoint::<CartClient>(EndpointOptions::new("http://localhost:5002"));
//!
//! let mut container = Container::new();
//! endpoints.register_all(&mut container)?;
//! let catalog = container.resolve::<dyn Catalog>();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use courier_core::di::{Container, ResolveError};
use courier_core::Contract;
use courier_middleware::CorrelationTokens;

use crate::options::EndpointOptions;
use crate::proxy::ClientProxy;
use crate::transport::{HttpTransport, ReqwestTransport};

/// A typed client generated for a contract.
pub trait ContractClient: Sized + Send + Sync + 'static {
    /// The contract trait object the client implements.
    type Contract: ?Sized + Contract;

    /// Wraps a proxy.
    fn from_proxy(proxy: ClientProxy) -> Self;

    /// Shares the client as its contract.
    fn into_contract(self) -> Arc<Self::Contract>;
}

type Register = Arc<dyn Fn(&Endpoints, &mut Container) -> Result<(), ResolveError> + Send + Sync>;

struct Entry {
    options: EndpointOptions,
    register: Register,
}

/// Endpoint settings per contract plus a shared transport.
#[derive(Clone)]
pub struct Endpoints {
    transport: Arc<dyn HttpTransport>,
    tokens: CorrelationTokens,
    entries: HashMap<&'static str, Arc<Entry>>,
}

impl Endpoints {
    /// Creates an empty registry sending through `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            tokens: CorrelationTokens::new(),
            entries: HashMap::new(),
        }
    }

    /// Creates an empty registry sending with a default reqwest client.
    pub fn reqwest() -> Self {
        Self::new(Arc::new(ReqwestTransport::new()))
    }

    /// Uses a non-default correlation header for every client.
    pub fn with_tokens(mut self, tokens: CorrelationTokens) -> Self {
        self.tokens = tokens;
        self
    }

    /// Declares where the contract of `K` is served.
    pub fn with_endpoint<K: ContractClient>(mut self, options: EndpointOptions) -> Self {
        let register: Register = Arc::new(|endpoints: &Endpoints, container: &mut Container| {
            let client = endpoints.client::<K>()?;
            container.register::<K::Contract>(client.into_contract());
            Ok(())
        });
        self.entries.insert(
            <K::Contract as Contract>::spec().name,
            Arc::new(Entry { options, register }),
        );
        self
    }

    /// The options declared for the contract of `K`.
    pub fn options<K: ContractClient>(&self) -> Option<&EndpointOptions> {
        self.entries
            .get(<K::Contract as Contract>::spec().name)
            .map(|entry| &entry.options)
    }

    /// Builds a client for the contract of `K`.
    pub fn client<K: ContractClient>(&self) -> Result<K, ResolveError> {
        let options = self
            .options::<K>()
            .ok_or_else(ResolveError::not_registered::<K::Contract>)?;
        let proxy = ClientProxy::new(
            <K::Contract as Contract>::spec(),
            options.clone(),
            Arc::clone(&self.transport),
        )
        .with_tokens(self.tokens.clone());
        Ok(K::from_proxy(proxy))
    }

    /// Registers every declared client in `container` under its contract.
    pub fn register_all(&self, container: &mut Container) -> Result<(), ResolveError> {
        for (name, entry) in &self.entries {
            tracing::debug!(contract = name, base_url = %entry.options.base_url, "registering client");
            (entry.register)(self, container)?;
        }
        Ok(())
    }

    /// Number of declared endpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no endpoint is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut contracts: Vec<_> = self.entries.keys().collect();
        contracts.sort();
        f.debug_struct("Endpoints")
            .field("contracts", &contracts)
            .finish_non_exhaustive()
    }
}
