use nimbus_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use nimbus_weather::{FetchError, LocationError};

pub fn location_error(e: LocationError) -> AppError {
    match e {
        LocationError::PermissionDenied => AppError::Weather(WeatherError::PermissionDenied),
        LocationError::ServiceUnavailable => AppError::Weather(WeatherError::ServiceUnavailable),
        LocationError::Timeout => AppError::Network(NetworkError::Timeout),
        LocationError::PositionUnavailable(s) => {
            AppError::Weather(WeatherError::LocationUnavailable(s))
        }
    }
}

pub fn fetch_error(e: FetchError) -> AppError {
    match e {
        FetchError::Network(e) => AppError::Network(e.into_network_error()),
        FetchError::InvalidApiKey => AppError::Weather(WeatherError::InvalidApiKey),
        FetchError::Status { status, message } if status >= 500 => {
            AppError::Network(NetworkError::ServerError { status, message })
        }
        FetchError::Status { status, message } => {
            AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
        }
        FetchError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
    }
}
