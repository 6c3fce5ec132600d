//! Session creation strategies.
//!
//! Newer camera stacks accept an explicit session configuration that
//! carries output configurations and session-level parameters. Older ones
//! only take a list of target surfaces. The strategy is chosen once from
//! the reported API level.

use crate::capture::{PreviewRequestSpec, SESSION_CONFIGURATION_MIN_API};
use crate::platform::SurfaceHandle;

/// How capture sessions are requested from the camera service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStrategy {
    /// Explicit output configurations plus session parameters.
    Configuration,
    /// Plain list of target surfaces.
    SurfaceList,
}

impl SessionStrategy {
    /// Picks the strategy supported by `api_level`.
    pub fn for_api_level(api_level: u32) -> Self {
        if api_level >= SESSION_CONFIGURATION_MIN_API {
            SessionStrategy::Configuration
        } else {
            SessionStrategy::SurfaceList
        }
    }

    /// Builds the session request for a single preview output.
    pub fn session_request(self, request: &PreviewRequestSpec) -> SessionRequest {
        match self {
            SessionStrategy::Configuration => SessionRequest::Configuration(SessionConfiguration {
                session_type: SessionType::Regular,
                outputs: vec![OutputConfiguration {
                    surface: request.target(),
                }],
                session_parameters: Some(request.clone()),
            }),
            SessionStrategy::SurfaceList => SessionRequest::SurfaceList(vec![request.target()]),
        }
    }
}

/// Session operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Regular,
}

/// One output stream of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfiguration {
    pub surface: SurfaceHandle,
}

/// Explicit session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfiguration {
    pub session_type: SessionType,
    pub outputs: Vec<OutputConfiguration>,
    /// Request whose settings the device may apply during configuration.
    pub session_parameters: Option<PreviewRequestSpec>,
}

/// What the camera service receives when asked for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Configuration(SessionConfiguration),
    SurfaceList(Vec<SurfaceHandle>),
}

impl SessionRequest {
    /// Returns the surfaces the session will render into.
    pub fn surfaces(&self) -> Vec<SurfaceHandle> {
        match self {
            SessionRequest::Configuration(config) => {
                config.outputs.iter().map(|o| o.surface).collect()
            }
            SessionRequest::SurfaceList(surfaces) => surfaces.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PreviewConfig;

    fn request() -> PreviewRequestSpec {
        PreviewRequestSpec::preview(SurfaceHandle(9), &PreviewConfig::default())
    }

    #[test]
    fn test_strategy_by_api_level() {
        assert_eq!(SessionStrategy::for_api_level(27), SessionStrategy::SurfaceList);
        assert_eq!(SessionStrategy::for_api_level(28), SessionStrategy::Configuration);
        assert_eq!(SessionStrategy::for_api_level(34), SessionStrategy::Configuration);
    }

    #[test]
    fn test_configuration_carries_session_parameters() {
        let spec = request();
        match SessionStrategy::Configuration.session_request(&spec) {
            SessionRequest::Configuration(config) => {
                assert_eq!(config.session_type, SessionType::Regular);
                assert_eq!(config.outputs.len(), 1);
                assert_eq!(config.session_parameters, Some(spec));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_surface_list_targets_preview_surface() {
        let request = SessionStrategy::SurfaceList.session_request(&request());
        assert_eq!(request, SessionRequest::SurfaceList(vec![SurfaceHandle(9)]));
        assert_eq!(request.surfaces(), vec![SurfaceHandle(9)]);
    }
}
