/// Kind of the template document describing the viewer workload.
pub const WORKLOAD_KIND: &str = "Workload";

/// Kind of the template document describing the companion network endpoint.
pub const ENDPOINT_KIND: &str = "Endpoint";

/// Name of the container that receives the injected environment.
pub const VIEWER_CONTAINER_NAME: &str = "viewer-box";

/// Label carried by selectors, pod templates and endpoint selectors to tie
/// the objects of one instance together.
pub const COMPONENT_LABEL: &str = "component";

/// Label binding every object of an instance to its index.
pub const INSTANCE_INDEX_LABEL: &str = "instance-index";

/// Component value assumed when the base selector does not declare one.
pub const DEFAULT_COMPONENT: &str = "viewer";

/// Identity store keys must carry this suffix to qualify as pool entries.
pub const IDENTITY_KEY_SUFFIX: &str = ".ovpn";

pub const ENV_BOX_NAME: &str = "BOX_NAME";
pub const ENV_STREAM_URL: &str = "STREAM_URL";
pub const ENV_VPN_CONFIG: &str = "VPN_CONFIG";
