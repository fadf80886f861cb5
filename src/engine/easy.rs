use curl::easy::{Easy, List};

use super::{Callbacks, Handle, HttpVersion, Opt};

impl Handle for Easy {
    type Error = curl::Error;

    fn create() -> Easy {
        super::init();
        trace!("creating curl easy handle");
        Easy::new()
    }

    fn set_option(&mut self, option: Opt) -> Result<(), curl::Error> {
        match option {
            Opt::Url(url) => self.url(&url),
            Opt::CookieSession(enabled) => self.cookie_session(enabled),
            Opt::Verbose(enabled) => self.verbose(enabled),
            Opt::MaxRedirections(max) => self.max_redirections(max),
            Opt::CustomRequest(method) => self.custom_request(&method),
            Opt::Post(enabled) => self.post(enabled),
            Opt::PostFieldSize(size) => self.post_field_size(size),
            Opt::NoBody(enabled) => self.nobody(enabled),
            Opt::Upload(enabled) => self.upload(enabled),
            Opt::InFileSize(size) => self.in_filesize(size),
            Opt::TcpNoDelay(enabled) => self.tcp_nodelay(enabled),
            Opt::HttpVersion(version) => self.http_version(match version {
                HttpVersion::Http10 => curl::easy::HttpVersion::V10,
                HttpVersion::Http11 => curl::easy::HttpVersion::V11,
            }),
            Opt::HttpHeaders(lines) => {
                let mut list = List::new();
                for line in &lines {
                    list.append(line)?;
                }
                self.http_headers(list)
            }
        }
    }

    fn perform(&mut self, callbacks: &dyn Callbacks) -> Result<(), curl::Error> {
        // The closures borrow `callbacks` for the lifetime of the transfer,
        // which ends before this function returns.
        let mut transfer = self.transfer();
        if callbacks.has_payload() {
            transfer.read_function(|buf| Ok(callbacks.read_payload(buf)))?;
        }
        transfer.write_function(|data| {
            callbacks.write_body(data);
            Ok(data.len())
        })?;
        transfer.header_function(|data| {
            callbacks.write_header(data);
            true
        })?;
        transfer.perform()
    }

    fn reset(&mut self) {
        Easy::reset(self)
    }
}
