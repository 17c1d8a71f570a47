// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::env;
use std::fs;
use std::path::Path;

use crate::algorithm::{MAX_MODULUS_BITS, MIN_MODULUS_BITS};
use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use toml;

pub const DEFAULT_CONF_NAME: &str = "provider.conf";

fn default_min_bits() -> u32 {
    MIN_MODULUS_BITS
}

fn default_max_bits() -> u32 {
    MAX_MODULUS_BITS
}

fn default_offload() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsaConfig {
    #[serde(default = "default_min_bits")]
    pub min_modulus_bits: u32,
    #[serde(default = "default_max_bits")]
    pub max_modulus_bits: u32,
    /// Run engine operations on the tokio blocking pool when a runtime
    /// is available
    #[serde(default = "default_offload")]
    pub offload: bool,
}

impl Default for RsaConfig {
    fn default() -> RsaConfig {
        RsaConfig {
            min_modulus_bits: default_min_bits(),
            max_modulus_bits: default_max_bits(),
            offload: default_offload(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rsa: RsaConfig,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn find_conf() -> Result<String> {
        /* First check for our own env var,
         * this has the highest precedence */
        if let Ok(var) = env::var("SUBTLE_RSA_CONF") {
            return Ok(var);
        }
        let datafile = match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => format!("{}/subtle-rsa/{}", xdg, DEFAULT_CONF_NAME),
            Err(_) => match env::var("HOME") {
                Ok(home) => {
                    format!("{}/.config/subtle-rsa/{}", home, DEFAULT_CONF_NAME)
                }
                Err(_) => {
                    return Err(Error::config(
                        "no configuration directory available".to_string(),
                    ))
                }
            },
        };
        if Path::new(&datafile).is_file() {
            Ok(datafile)
        } else {
            Err(Error::config(format!("{} not found", datafile)))
        }
    }

    pub fn from_file(filename: &str) -> Result<Config> {
        let config_str = fs::read_to_string(filename)?;
        Config::from_str(&config_str)
    }

    pub fn from_str(config_str: &str) -> Result<Config> {
        let conf: Config = toml::from_str(config_str)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Loads the configuration file if one can be found, defaults
    /// otherwise
    pub fn load() -> Result<Config> {
        match Config::find_conf() {
            Ok(filename) => Config::from_file(&filename),
            Err(_) => Ok(Config::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.modulus_bounds();
        for bits in [min, max] {
            if bits < MIN_MODULUS_BITS || bits > MAX_MODULUS_BITS {
                return Err(Error::config(format!(
                    "modulus bound {} outside of [{}, {}]",
                    bits, MIN_MODULUS_BITS, MAX_MODULUS_BITS
                )));
            }
            if bits % 8 != 0 {
                return Err(Error::config(format!(
                    "modulus bound {} is not a multiple of 8",
                    bits
                )));
            }
        }
        if min > max {
            return Err(Error::config(format!(
                "min_modulus_bits {} exceeds max_modulus_bits {}",
                min, max
            )));
        }
        Ok(())
    }

    pub fn modulus_bounds(&self) -> (u32, u32) {
        (self.rsa.min_modulus_bits, self.rsa.max_modulus_bits)
    }

    pub fn offload(&self) -> bool {
        self.rsa.offload
    }
}
