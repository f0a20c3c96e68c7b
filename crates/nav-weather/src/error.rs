use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather provider unavailable: {0}")]
    Provider(String),
}

pub type WeatherResult<T> = Result<T, WeatherError>;
