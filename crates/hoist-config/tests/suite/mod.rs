mod loading;
mod logging;
mod validation;
