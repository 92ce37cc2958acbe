use hoist_core::{BuildConfig, Ecosystem};

/// Renders the fallback Dockerfile for a source tree that ships none.
pub struct DockerfileGenerator<'a> {
    config: &'a BuildConfig,
    ecosystem: Ecosystem,
    port: u16,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(config: &'a BuildConfig, ecosystem: Ecosystem, port: u16) -> Self {
        Self {
            config,
            ecosystem,
            port,
        }
    }

    pub fn render(&self) -> String {
        match self.ecosystem {
            Ecosystem::Python => self.render_python(),
            Ecosystem::Node => self.render_node(),
            Ecosystem::Unknown => self.render_placeholder(),
        }
    }

    fn render_python(&self) -> String {
        format!(
            r#"FROM {image}
WORKDIR /app
COPY requirements.txt requirements.txt
RUN pip install --no-cache-dir -r requirements.txt || true
COPY . .
ENV PORT={port}
EXPOSE {port}
CMD ["python", "-m", "gunicorn", "--bind", "0.0.0.0:{port}", "app:app"]
"#,
            image = self.config.python_image,
            port = self.port,
        )
    }

    fn render_node(&self) -> String {
        format!(
            r#"FROM {image}
WORKDIR /app
COPY package*.json ./
RUN npm ci || npm install
COPY . .
ENV PORT={port}
EXPOSE {port}
CMD ["npm", "start"]
"#,
            image = self.config.node_image,
            port = self.port,
        )
    }

    // Idles; used when no runtime was inferred.
    fn render_placeholder(&self) -> String {
        format!(
            r#"FROM {image}
ENV PORT={port}
EXPOSE {port}
CMD ["sh", "-c", "echo 'unsupported source tree: no runtime detected'; sleep 3600"]
"#,
            image = self.config.placeholder_image,
            port = self.port,
        )
    }
}
